//! TikZ markup for individual labels.

use crate::error::Result;
use crate::layout::{Placement, Transition};
use crate::qr::{QrPayload, qr_svg};
use crate::record::Record;
use crate::seal::{self, SealValues};
use crate::template::{Layout, Template};

pub const DEFAULT_LOGO: &str = "20110623skyworkslogo";
pub const DEFAULT_BRAND: &str = r"天空\\工场";

/// Opens a drawing surface pinned to the top left corner of the page.
pub const OPEN_PICTURE: &str =
    "\\begin{tikzpicture}[remember picture, overlay, shift=(current page.north west)]\n";
pub const CLOSE_PICTURE: &str = "\\end{tikzpicture}";

const MUTED_OPACITY: &str = "0.35";

/// Per-run rendering knobs that are independent of the template.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub payload: QrPayload,
    /// Replaces the logo (standard) or brand mark (side by side).
    pub caption: Option<String>,
    /// Graphic name passed to `\includegraphics`.
    pub logo: String,
    /// Directory the generated assets are referenced from inside the document.
    pub asset_dir: String,
    /// Fade seal labels, used for example sheets.
    pub muted: bool,
    pub seal_fragment: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            payload: QrPayload::default(),
            caption: None,
            logo: DEFAULT_LOGO.to_string(),
            asset_dir: "./temp".to_string(),
            muted: false,
            seal_fragment: seal::BUILTIN_FRAGMENT.to_string(),
        }
    }
}

/// A file the document refers to and that must exist before compiling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    pub name: String,
    pub contents: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedCell {
    pub markup: String,
    pub assets: Vec<Asset>,
}

// Format millimeters:
// - Near-integers (1e-6) as integers
// - Else up to 3 decimals, trim trailing zeros
pub fn fmt_mm(v: f64) -> String {
    if (v - v.round()).abs() < 1e-6 {
        format!("{:.0}", v.round())
    } else {
        format!("{:.3}", v)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

/// Center of the square QR box of the cell at (`column`, `row`), measured
/// right and down from the page's top left corner.
///
/// The box side is the label width, so both axes start from half of it.
pub fn cell_center(template: &Template, column: u32, row: u32) -> (f64, f64) {
    let half = 0.5 * template.label_size[0];
    (
        half + f64::from(column - 1) * template.cell_sep[0],
        half + f64::from(row - 1) * template.cell_sep[1],
    )
}

pub struct Renderer<'a> {
    template: &'a Template,
    options: &'a RenderOptions,
}

impl<'a> Renderer<'a> {
    pub fn new(template: &'a Template, options: &'a RenderOptions) -> Self {
        Renderer { template, options }
    }

    pub fn render(&self, placement: &Placement, record: &Record) -> Result<RenderedCell> {
        let t = self.template;
        record.expect_arity(t.layout.arity())?;

        let n = placement.index;
        let qr = Asset {
            name: format!("qr{n}.svg"),
            contents: qr_svg(&self.options.payload.encode(record.payload()))?,
        };
        let qr_ref = format!("{}/qr{n}", self.options.asset_dir);
        let (x, y) = cell_center(t, placement.column, placement.row);

        let mut m = String::new();
        if placement.transition == Transition::NewPage {
            m.push_str(CLOSE_PICTURE);
            m.push_str("\\newpage");
            m.push_str(OPEN_PICTURE);
        }
        match &t.layout {
            Layout::Standard => self.standard(&mut m, n, x, y, &qr_ref, record),
            Layout::SideBySide => self.side_by_side(&mut m, n, x, y, placement.row, &qr_ref, record),
            Layout::Seal { .. } => self.seal(&mut m, x, y, &qr_ref, record)?,
        }
        Ok(RenderedCell {
            markup: m,
            assets: vec![qr],
        })
    }

    fn standard(&self, m: &mut String, n: u64, x: f64, y: f64, qr_ref: &str, record: &Record) {
        let t = self.template;
        m.push_str(&format!(
            "\\node (qrcode{n}) at ({}mm, -{}mm) [anchor=center] {{\\includesvg[width={}mm]{{{qr_ref}}}}};\n",
            fmt_mm(x),
            fmt_mm(y),
            fmt_mm(t.qr_size),
        ));
        let logo_shift = format!(
            "shift={{({}mm,{}mm)}}",
            fmt_mm(t.logo_offset[0]),
            fmt_mm(t.logo_offset[1])
        );
        match &self.options.caption {
            Some(caption) => {
                m.push_str(&format!(
                    "\\node[anchor=north,inner sep=0,align=center,font=\\sffamily\\{},{logo_shift}] (logo{n}) at (qrcode{n}.south) {{{caption}}};\n",
                    t.text_size
                ));
            }
            None => {
                m.push_str(&format!(
                    "\\node[anchor=north,inner sep=0,{logo_shift}] (logo{n}) at (qrcode{n}.south) {{\\includegraphics[width={}mm]{{{}}}}};\n",
                    fmt_mm(t.logo_width),
                    self.options.logo
                ));
            }
        }
        m.push_str(&format!(
            "\\node[anchor=north,inner sep=0,shift={{({}mm,{}mm)}}] (text{n}) at (logo{n}.south) {{\\{}\\sffamily {}}};\n",
            fmt_mm(t.text_offset[0]),
            fmt_mm(t.text_offset[1]),
            t.text_size,
            record.text()
        ));
    }

    #[allow(clippy::too_many_arguments)]
    fn side_by_side(
        &self,
        m: &mut String,
        n: u64,
        x: f64,
        y: f64,
        row: u32,
        qr_ref: &str,
        record: &Record,
    ) {
        let t = self.template;
        let brand = self.options.caption.as_deref().unwrap_or(DEFAULT_BRAND);
        let bottom = t.label_size[1] + f64::from(row - 1) * t.cell_sep[1];
        m.push_str(&format!(
            "\\node (qrcode{n}) at ({}mm, -{}mm) [inner sep=0,anchor=center] {{\\includesvg[width={}mm]{{{qr_ref}}}}};\n",
            fmt_mm(x),
            fmt_mm(y),
            fmt_mm(t.qr_size),
        ));
        m.push_str("\\baselineskip=2mm\n");
        m.push_str(&format!(
            "\\path (qrcode{n}.south west) -- node[inner sep=0,midway,anchor=west,align=center,font=\\sffamily\\{size}] (logo{n}) {{{brand}}} (qrcode{n}.south west |- 0mm,-{}mm);\n",
            fmt_mm(bottom),
            size = t.text_size,
        ));
        m.push_str(&format!(
            "\\path (logo{n}.east) -- node[midway,anchor=center,font=\\{}\\sffamily,align=center] (text{n}) {{{}}} (logo{n}.east -| qrcode{n}.east);\n",
            t.text_size,
            record.text()
        ));
    }

    fn seal(&self, m: &mut String, x: f64, y: f64, qr_ref: &str, record: &Record) -> Result<()> {
        let t = self.template;
        let qr_size = fmt_mm(t.qr_size);
        let body = seal::fill(
            &self.options.seal_fragment,
            record,
            &SealValues {
                qr_path: qr_ref,
                qr_size: &qr_size,
                text_size: &t.text_size,
            },
        )?;
        let opacity = if self.options.muted {
            format!(",opacity={MUTED_OPACITY}")
        } else {
            String::new()
        };
        m.push_str(&format!(
            "\\begin{{scope}}[shift={{({}mm,-{}mm)}}{opacity}]\n",
            fmt_mm(x),
            fmt_mm(y)
        ));
        m.push_str(body.trim_end());
        m.push_str("\n\\end{scope}\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LabelError;
    use crate::layout::{Grid, LayoutEngine};
    use crate::template::Catalog;

    fn placements(t: &Template, n: usize) -> Vec<Placement> {
        let mut engine = LayoutEngine::new(t.grid().unwrap());
        (0..n).map(|_| engine.advance()).collect()
    }

    #[test]
    fn formats_millimeters_compactly() {
        assert_eq!(fmt_mm(25.0), "25");
        assert_eq!(fmt_mm(7.5), "7.5");
        assert_eq!(fmt_mm(-3.5), "-3.5");
        assert_eq!(fmt_mm(0.1 + 0.2), "0.3");
        assert_eq!(fmt_mm(51.5), "51.5");
    }

    #[test]
    fn strip_centers_step_by_cell_separation() {
        let catalog = Catalog::default();
        let t = catalog.get("2015TB").unwrap();
        assert_eq!(cell_center(t, 1, 1), (7.5, 7.5));
        assert_eq!(cell_center(t, 1, 2), (7.5, 29.5));
        assert_eq!(cell_center(t, 1, 3), (7.5, 51.5));
        assert_eq!(cell_center(t, 1, 3), cell_center(t, 1, 3));
    }

    #[test]
    fn standard_label_markup() {
        let catalog = Catalog::default();
        let t = catalog.get("8050A").unwrap();
        let opts = RenderOptions::default();
        let p = placements(t, 1)[0];
        let cell = Renderer::new(t, &opts)
            .render(&p, &Record::new(["天空工场", "Skyworks"]))
            .unwrap();
        let expected = concat!(
            "\\node (qrcode1) at (25mm, -25mm) [anchor=center] {\\includesvg[width=45mm]{./temp/qr1}};\n",
            "\\node[anchor=north,inner sep=0,shift={(0mm,-1mm)}] (logo1) at (qrcode1.south) {\\includegraphics[width=35mm]{20110623skyworkslogo}};\n",
            "\\node[anchor=north,inner sep=0,shift={(0mm,-3.5mm)}] (text1) at (logo1.south) {\\LARGE\\sffamily 天空工场};\n",
        );
        assert_eq!(cell.markup, expected);
        assert_eq!(cell.assets.len(), 1);
        assert_eq!(cell.assets[0].name, "qr1.svg");
    }

    #[test]
    fn caption_replaces_the_logo() {
        let catalog = Catalog::default();
        let t = catalog.get("5030A").unwrap();
        let opts = RenderOptions {
            caption: Some("Makerspace".into()),
            ..Default::default()
        };
        let p = placements(t, 1)[0];
        let cell = Renderer::new(t, &opts)
            .render(&p, &Record::new(["Drill", "Drill"]))
            .unwrap();
        assert!(cell.markup.contains("(logo1) at (qrcode1.south) {Makerspace};"));
        assert!(!cell.markup.contains("includegraphics"));
    }

    #[test]
    fn page_break_precedes_later_pages_only() {
        let catalog = Catalog::default();
        let t = catalog.get("8050A").unwrap();
        let opts = RenderOptions::default();
        let r = Renderer::new(t, &opts);
        let ps = placements(t, 2);
        let first = r.render(&ps[0], &Record::new(["a", "a"])).unwrap();
        let second = r.render(&ps[1], &Record::new(["b", "b"])).unwrap();
        assert!(first.markup.starts_with("\\node (qrcode1)"));
        assert!(second.markup.starts_with(&format!(
            "{CLOSE_PICTURE}\\newpage{OPEN_PICTURE}\\node (qrcode2)"
        )));
    }

    #[test]
    fn side_by_side_tracks_row_bottom() {
        let catalog = Catalog::default();
        let t = catalog.get("2015TB").unwrap();
        let opts = RenderOptions::default();
        let r = Renderer::new(t, &opts);
        let ps = placements(t, 2);
        let cell = r.render(&ps[1], &Record::new(["天空工场", "Skyworks2"])).unwrap();
        assert!(cell.markup.starts_with(
            "\\node (qrcode2) at (7.5mm, -29.5mm) [inner sep=0,anchor=center] {\\includesvg[width=13mm]{./temp/qr2}};\n\\baselineskip=2mm\n"
        ));
        assert!(cell.markup.contains(r"(logo2) {天空\\工场} (qrcode2.south west |- 0mm,-42mm);"));
        assert!(cell.markup.contains("(text2) {天空工场} (logo2.east -| qrcode2.east);"));
    }

    #[test]
    fn seal_scope_is_shifted_and_optionally_muted() {
        let catalog = Catalog::default();
        let t = catalog.get("4040S").unwrap();
        let rec = Record::new(["天空工场", "Skyworks", "guest", "pw"]);
        let p = placements(t, 1)[0];

        let plain = RenderOptions::default();
        let cell = Renderer::new(t, &plain).render(&p, &rec).unwrap();
        assert!(cell.markup.starts_with("\\begin{scope}[shift={(20mm,-20mm)}]\n"));
        assert!(cell.markup.ends_with("\\end{scope}\n"));
        assert!(cell.markup.contains(r"guest\\pw"));

        let muted = RenderOptions {
            muted: true,
            ..Default::default()
        };
        let cell = Renderer::new(t, &muted).render(&p, &rec).unwrap();
        assert!(cell.markup.starts_with("\\begin{scope}[shift={(20mm,-20mm)},opacity=0.35]\n"));
    }

    #[test]
    fn wrong_arity_is_rejected_before_rendering() {
        let catalog = Catalog::default();
        let t = catalog.get("4040S").unwrap();
        let opts = RenderOptions::default();
        let p = placements(t, 1)[0];
        let mut rec = Record::new(["only", "two"]);
        rec.line = 3;
        assert!(matches!(
            Renderer::new(t, &opts).render(&p, &rec),
            Err(LabelError::Arity {
                line: 3,
                expected: 4,
                found: 2
            })
        ));
    }

    #[test]
    fn same_cursor_same_markup() {
        let catalog = Catalog::default();
        let t = catalog.get("2015TB").unwrap();
        let opts = RenderOptions::default();
        let r = Renderer::new(t, &opts);
        let rec = Record::new(["天空工场", "Skyworks"]);

        let mut a = LayoutEngine::new(Grid::new(1, 3).unwrap());
        let mut b = LayoutEngine::new(Grid::new(1, 3).unwrap());
        for _ in 0..4 {
            let pa = a.advance();
            let pb = b.advance();
            assert_eq!(r.render(&pa, &rec).unwrap(), r.render(&pb, &rec).unwrap());
        }
    }

    #[test]
    fn repeat_on_next_cell_differs_only_by_counter() {
        let catalog = Catalog::default();
        let t = catalog.get("8050A").unwrap();
        let opts = RenderOptions::default();
        let r = Renderer::new(t, &opts);
        let rec = Record::new(["a", "a"]);
        let ps = placements(t, 3);
        let second = r.render(&ps[1], &rec).unwrap();
        let third = r.render(&ps[2], &rec).unwrap();
        let renumbered = ["qrcode", "logo", "text", "/qr"]
            .iter()
            .fold(second.markup.clone(), |m, name| {
                m.replace(&format!("{name}2"), &format!("{name}3"))
            });
        assert_eq!(renumbered, third.markup);
        assert_eq!(second.assets[0].contents, third.assets[0].contents);
    }
}
