//! Whole-document assembly: preamble, one cell per record, closer.

use tracing::{debug, info};

use crate::error::Result;
use crate::layout::LayoutEngine;
use crate::record::Record;
use crate::render::{Asset, CLOSE_PICTURE, OPEN_PICTURE, RenderOptions, Renderer, fmt_mm};
use crate::template::Template;

const PACKAGES: &str = r"
\documentclass{minimal}
\usepackage[UTF8]{ctex}
\usepackage{hyperref}
\usepackage{graphicx}
\usepackage{tikz}
\usepackage{svg}
";

pub fn preamble(template: &Template) -> String {
    format!(
        "{PACKAGES}\\usepackage[papersize={{{}mm, {}mm}}]{{geometry}}\n\\linespread{{0.9}}\n\\begin{{document}}\n{OPEN_PICTURE}",
        fmt_mm(template.page_size[0]),
        fmt_mm(template.page_size[1]),
    )
}

pub fn closer() -> String {
    format!("{CLOSE_PICTURE}\n\\end{{document}}")
}

/// A complete document plus the files it includes.
#[derive(Clone, Debug)]
pub struct Sheet {
    pub tex: String,
    pub assets: Vec<Asset>,
    pub labels: u64,
    pub pages: u32,
}

impl Sheet {
    /// Lay out and render `records` in order. Any bad record aborts the
    /// whole sheet.
    pub fn build(template: &Template, records: &[Record], options: &RenderOptions) -> Result<Self> {
        let mut engine = LayoutEngine::new(template.grid()?);
        let renderer = Renderer::new(template, options);
        let mut tex = preamble(template);
        let mut assets = Vec::with_capacity(records.len());
        for record in records {
            let placement = engine.advance();
            debug!(
                line = record.line,
                page = placement.page,
                row = placement.row,
                column = placement.column,
                transition = ?placement.transition,
                "placing label"
            );
            let cell = renderer.render(&placement, record)?;
            tex.push_str(&cell.markup);
            assets.extend(cell.assets);
        }
        tex.push_str(&closer());
        let cursor = engine.cursor();
        info!(labels = cursor.count, pages = cursor.page, "sheet laid out");
        Ok(Sheet {
            tex,
            assets,
            labels: cursor.count,
            pages: cursor.page,
        })
    }
}
