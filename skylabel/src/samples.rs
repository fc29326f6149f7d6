use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use skylabel_core::{Catalog, RenderOptions, Sheet};
use tracing::{info, warn};

use crate::compile::{self, CompileConfig};

/// Build one page of sample labels per template and rasterize it into
/// `preview_dir/<TEMPLATE>*.png`.
pub fn generate(
    catalog: &Catalog,
    options: &RenderOptions,
    cfg: &CompileConfig,
    preview_dir: &Path,
) -> Result<()> {
    fs::create_dir_all(preview_dir)
        .with_context(|| format!("Failed to create {}", preview_dir.display()))?;
    let options = RenderOptions {
        muted: true,
        ..options.clone()
    };
    for (name, template) in catalog.iter() {
        let records = template
            .sample_records()
            .with_context(|| format!("Bad samples for {name}"))?;
        if records.is_empty() {
            warn!(template = %name, "no sample records, skipping");
            continue;
        }
        let sheet = Sheet::build(template, &records, &options)
            .with_context(|| format!("Failed to lay out samples for {name}"))?;
        compile::write_sheet(cfg, name, &sheet)?;
        let pdf = compile::typeset(cfg, name)?;
        compile::rasterize(cfg, &pdf, &preview_dir.join(name))?;
        info!(template = %name, "preview written");
    }
    Ok(())
}
