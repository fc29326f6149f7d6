//! Label stock definitions and the catalog they are picked from.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LabelError, Result};
use crate::layout::Grid;
use crate::record::Record;

/// How a single label is drawn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// QR on top, logo below it, text below the logo.
    Standard,
    /// QR on top, brand caption and text side by side underneath.
    SideBySide,
    /// Record fields poured into the seal fragment.
    Seal { fields: usize },
}

impl Layout {
    /// Number of fields every record must carry.
    pub fn arity(&self) -> usize {
        match self {
            Layout::Standard | Layout::SideBySide => 2,
            Layout::Seal { fields } => *fields,
        }
    }
}

/// Physical description of one label stock. Lengths are in millimeters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub page_size: [f64; 2],
    pub label_size: [f64; 2],
    /// Columns and rows per page.
    #[serde(default = "one_by_one")]
    pub matrix: [u32; 2],
    #[serde(default)]
    pub cell_sep: [f64; 2],
    pub qr_size: f64,
    pub logo_width: f64,
    #[serde(default)]
    pub logo_offset: [f64; 2],
    /// TeX size command without the backslash, e.g. `LARGE`.
    pub text_size: String,
    #[serde(default)]
    pub text_offset: [f64; 2],
    pub layout: Layout,
    /// Records used for example sheets.
    #[serde(default)]
    pub samples: Vec<Vec<String>>,
}

fn one_by_one() -> [u32; 2] {
    [1, 1]
}

impl Template {
    pub fn grid(&self) -> Result<Grid> {
        Grid::new(self.matrix[0], self.matrix[1])
    }

    /// Sample records filling exactly one page, cycling if fewer are defined.
    pub fn sample_records(&self) -> Result<Vec<Record>> {
        let cells = self.grid()?.cells() as usize;
        if self.samples.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .samples
            .iter()
            .cycle()
            .take(cells)
            .map(|fields| Record::new(fields.iter().cloned()))
            .collect())
    }

    fn validate(&self, name: &str) -> Result<()> {
        let invalid = |reason: &str| LabelError::InvalidTemplate {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        if let Err(LabelError::InvalidTemplate { reason, .. }) = self.grid() {
            return Err(invalid(&reason));
        }
        if self.text_size.is_empty() || !self.text_size.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid("text_size must be a TeX size name such as `large`"));
        }
        if self.layout.arity() < 2 {
            return Err(invalid("layouts need at least a text and a payload field"));
        }
        if let Some(bad) = self
            .samples
            .iter()
            .find(|s| s.len() != self.layout.arity())
        {
            return Err(invalid(&format!(
                "sample {:?} does not have {} fields",
                bad,
                self.layout.arity()
            )));
        }
        Ok(())
    }
}

fn pair(name: &str) -> Vec<String> {
    vec![name.to_string(), name.to_string()]
}

/// The built-in label stocks.
pub fn builtin() -> BTreeMap<String, Template> {
    let mut m = BTreeMap::new();
    m.insert(
        "8050A".to_string(),
        Template {
            page_size: [50.0, 80.0],
            label_size: [50.0, 80.0],
            matrix: [1, 1],
            cell_sep: [0.0, 0.0],
            qr_size: 45.0,
            logo_width: 35.0,
            logo_offset: [0.0, -1.0],
            text_size: "LARGE".into(),
            text_offset: [0.0, -3.5],
            layout: Layout::Standard,
            samples: vec![pair("天空工场")],
        },
    );
    m.insert(
        "5030A".to_string(),
        Template {
            page_size: [30.0, 50.0],
            label_size: [30.0, 50.0],
            matrix: [1, 1],
            cell_sep: [0.0, 0.0],
            qr_size: 26.0,
            logo_width: 23.0,
            logo_offset: [0.0, -1.0],
            text_size: "large".into(),
            text_offset: [0.0, -2.5],
            layout: Layout::Standard,
            samples: vec![pair("天空工场")],
        },
    );
    // 20mm x 15mm, three to a strip
    m.insert(
        "2015TB".to_string(),
        Template {
            page_size: [15.0, 64.0],
            label_size: [15.0, 20.0],
            matrix: [1, 3],
            cell_sep: [0.0, 22.0],
            qr_size: 13.0,
            logo_width: 5.0,
            logo_offset: [0.0, 0.0],
            text_size: "tiny".into(),
            text_offset: [0.0, 0.0],
            layout: Layout::SideBySide,
            samples: (1..=3)
                .map(|i| vec!["天空工场".to_string(), format!("Skyworks{i}")])
                .collect(),
        },
    );
    m.insert(
        "4040S".to_string(),
        Template {
            page_size: [40.0, 40.0],
            label_size: [40.0, 40.0],
            matrix: [1, 1],
            cell_sep: [0.0, 0.0],
            qr_size: 16.0,
            logo_width: 0.0,
            logo_offset: [0.0, 0.0],
            text_size: "scriptsize".into(),
            text_offset: [0.0, 0.0],
            layout: Layout::Seal { fields: 4 },
            samples: vec![vec![
                "天空工场".into(),
                "Skyworks".into(),
                "guest".into(),
                "skyworks".into(),
            ]],
        },
    );
    m
}

/// Named templates, built-ins first and then anything loaded on top.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Catalog {
    pub templates: BTreeMap<String, Template>,
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog {
            templates: builtin(),
        }
    }
}

impl Catalog {
    /// Parse a `{"templates": {...}}` document.
    pub fn from_json(text: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(text)?;
        for (name, t) in &catalog.templates {
            t.validate(name)?;
        }
        Ok(catalog)
    }

    /// Add the templates of `path`, replacing built-ins with the same name.
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let extra = Catalog::from_json(&fs::read_to_string(path)?)?;
        self.templates.extend(extra.templates);
        Ok(())
    }

    pub fn names(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Result<&Template> {
        self.templates
            .get(name)
            .ok_or_else(|| LabelError::UnknownTemplate {
                name: name.to_string(),
                choices: self.names(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Template)> {
        self.templates.iter()
    }
}
