//! Driving the TeX engine and the rasterizer.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use anyhow::{Context, Result, bail};
use skylabel_core::Sheet;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {status}")]
    Failed { program: String, status: ExitStatus },
}

#[derive(Clone, Debug)]
pub struct CompileConfig {
    pub engine: String,
    pub rasterizer: String,
    /// Scratch directory for `.tex`, assets and engine output.
    pub work_dir: PathBuf,
}

impl Default for CompileConfig {
    fn default() -> Self {
        CompileConfig {
            engine: "xelatex".to_string(),
            rasterizer: "pdftopng".to_string(),
            work_dir: PathBuf::from("./temp"),
        }
    }
}

impl CompileConfig {
    /// How the work directory is spelled inside the document.
    pub fn asset_dir(&self) -> String {
        let dir = self.work_dir.to_string_lossy().replace('\\', "/");
        let trimmed = dir.trim_end_matches('/');
        if trimmed.is_empty() { dir } else { trimmed.to_string() }
    }

    fn job_file(&self, job: &str, ext: &str) -> PathBuf {
        self.work_dir.join(format!("{job}.{ext}"))
    }
}

/// Start from an empty work directory.
///
/// Refuses a directory that is, or contains, any path in `keep` (the
/// current directory and the input files).
pub fn prepare_work_dir(dir: &Path, keep: &[&Path]) -> Result<()> {
    if dir.exists() {
        let resolved = dir
            .canonicalize()
            .with_context(|| format!("Failed to resolve work directory: {}", dir.display()))?;
        for path in keep {
            if let Ok(kept) = path.canonicalize()
                && kept.starts_with(&resolved)
            {
                bail!(
                    "Refusing to clear work directory {}: it contains {}",
                    dir.display(),
                    path.display()
                );
            }
        }
        fs::remove_dir_all(dir)
            .with_context(|| format!("Failed to clear work directory: {}", dir.display()))?;
    }
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create work directory: {}", dir.display()))
}

/// Write the document and every asset it includes. Returns the `.tex` path.
pub fn write_sheet(cfg: &CompileConfig, job: &str, sheet: &Sheet) -> Result<PathBuf> {
    for asset in &sheet.assets {
        let path = cfg.work_dir.join(&asset.name);
        fs::write(&path, &asset.contents)
            .with_context(|| format!("Failed to write asset: {}", path.display()))?;
    }
    let tex = cfg.job_file(job, "tex");
    fs::write(&tex, &sheet.tex)
        .with_context(|| format!("Failed to write document: {}", tex.display()))?;
    Ok(tex)
}

/// Run `program` to completion with inherited stdio.
pub fn run(program: &str, args: &[String]) -> Result<(), CompileError> {
    debug!(program, ?args, "spawning");
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|source| CompileError::Spawn {
            program: program.to_string(),
            source,
        })?;
    if !status.success() {
        return Err(CompileError::Failed {
            program: program.to_string(),
            status,
        });
    }
    Ok(())
}

/// Compile `job` twice (the second pass picks up node positions recorded
/// by the first) and return the produced PDF.
pub fn typeset(cfg: &CompileConfig, job: &str) -> Result<PathBuf, CompileError> {
    let args = vec![
        "-shell-escape".to_string(),
        "-interaction=nonstopmode".to_string(),
        format!("-output-directory={}", cfg.asset_dir()),
        "-halt-on-error".to_string(),
        cfg.job_file(job, "tex").to_string_lossy().into_owned(),
    ];
    for pass in 1..=2 {
        info!(job, pass, engine = %cfg.engine, "typesetting");
        run(&cfg.engine, &args)?;
    }
    Ok(cfg.job_file(job, "pdf"))
}

/// Copy the compiled PDF into `dest_dir`. Nothing is copied when the PDF
/// already lives there.
pub fn deliver(pdf: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let name = pdf
        .file_name()
        .with_context(|| format!("Not a file path: {}", pdf.display()))?;
    let dest = dest_dir.join(name);
    if let (Ok(from), Ok(to)) = (pdf.canonicalize(), dest.canonicalize())
        && from == to
    {
        debug!(pdf = %pdf.display(), "already in place");
        return Ok(dest);
    }
    fs::copy(pdf, &dest).with_context(|| {
        format!("Failed to copy {} to {}", pdf.display(), dest.display())
    })?;
    Ok(dest)
}

/// Render every page of `pdf` to PNGs named after `root`.
pub fn rasterize(cfg: &CompileConfig, pdf: &Path, root: &Path) -> Result<(), CompileError> {
    info!(pdf = %pdf.display(), "rasterizing preview");
    run(
        &cfg.rasterizer,
        &[
            pdf.to_string_lossy().into_owned(),
            root.to_string_lossy().into_owned(),
        ],
    )
}
