//! skylabel - QR label sheets for thermal label printers
//!
//! Usage:
//!   skylabel -i input.csv -o output -t 2015TB
//!   skylabel --generate-examples

use std::path::{Path, PathBuf};
use std::{env, fs};

use anyhow::{Context, Result};
use clap::Parser;
use skylabel_core::render::DEFAULT_LOGO;
use skylabel_core::{
    Catalog, DEFAULT_URL_PREFIX, QrPayload, RenderOptions, Sheet, read_records_from_path,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod compile;
mod samples;

use compile::CompileConfig;

#[derive(Parser, Debug)]
#[command(name = "skylabel")]
#[command(
    about = "Generate a PDF file for printing on adhesive labels with thermal printer."
)]
#[command(version)]
struct Cli {
    /// Input file name.
    #[arg(short = 'i', value_name = "INPUT", default_value = "input.csv")]
    infile: PathBuf,

    /// Output PDF file name prefix.
    #[arg(short = 'o', value_name = "OUTPUT", default_value = "output")]
    outfile: String,

    /// Label size and layout.
    #[arg(short = 't', value_name = "TYPE", default_value = "8050A")]
    template: String,

    /// Encode the payload without the URL prefix
    #[arg(short = 'c', long)]
    custom_url: bool,

    /// Put the payload into the QR code without URL-escaping it
    #[arg(long)]
    no_escape: bool,

    /// Caption printed in place of the logo / brand mark
    #[arg(long, value_name = "TEXT")]
    caption: Option<String>,

    /// Build one sample sheet per template and rasterize previews
    #[arg(long)]
    generate_examples: bool,

    /// Verbose logging
    #[arg(long)]
    debug: bool,

    /// Extra templates (JSON) merged over the built-in ones
    #[arg(long, value_name = "FILE")]
    templates: Option<PathBuf>,

    /// TikZ fragment used by seal layouts
    #[arg(long, value_name = "FILE")]
    seal_fragment: Option<PathBuf>,

    #[arg(long, value_name = "URL", default_value = DEFAULT_URL_PREFIX)]
    url_prefix: String,

    /// Graphic included as the logo of standard labels
    #[arg(long, value_name = "NAME", default_value = DEFAULT_LOGO)]
    logo: String,

    #[arg(long, value_name = "BIN", default_value = "xelatex")]
    engine: String,

    #[arg(long, value_name = "DIR", default_value = "./temp")]
    work_dir: PathBuf,

    #[arg(long, value_name = "DIR", default_value = "previews")]
    preview_dir: PathBuf,
}

impl Cli {
    fn render_options(&self, asset_dir: String) -> Result<RenderOptions> {
        let mut options = RenderOptions {
            payload: QrPayload {
                prefix: (!self.custom_url).then(|| self.url_prefix.clone()),
                escape: !self.no_escape,
            },
            caption: self.caption.clone(),
            logo: self.logo.clone(),
            asset_dir,
            ..Default::default()
        };
        if let Some(path) = &self.seal_fragment {
            options.seal_fragment = fs::read_to_string(path)
                .with_context(|| format!("Failed to read seal fragment: {}", path.display()))?;
        }
        Ok(options)
    }

    /// Paths that must survive clearing the work directory.
    fn kept_paths<'a>(&'a self, cwd: &'a Path) -> Vec<&'a Path> {
        let mut keep = vec![cwd, self.infile.as_path()];
        keep.extend(self.templates.as_deref());
        keep.extend(self.seal_fragment.as_deref());
        keep
    }

    fn compile_config(&self) -> CompileConfig {
        CompileConfig {
            engine: self.engine.clone(),
            work_dir: self.work_dir.clone(),
            ..Default::default()
        }
    }
}

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let mut catalog = Catalog::default();
    if let Some(path) = &cli.templates {
        catalog
            .merge_file(path)
            .with_context(|| format!("Failed to load templates: {}", path.display()))?;
    }
    let template = catalog.get(&cli.template)?;

    let cfg = cli.compile_config();
    let options = cli.render_options(cfg.asset_dir())?;
    let cwd = env::current_dir()?;
    compile::prepare_work_dir(&cfg.work_dir, &cli.kept_paths(&cwd))?;

    if cli.generate_examples {
        return samples::generate(&catalog, &options, &cfg, &cli.preview_dir);
    }

    let records = read_records_from_path(&cli.infile)
        .with_context(|| format!("Failed to read {}", cli.infile.display()))?;
    let sheet = Sheet::build(template, &records, &options)
        .with_context(|| format!("Failed to lay out {}", cli.infile.display()))?;
    compile::write_sheet(&cfg, &cli.outfile, &sheet)?;
    let pdf = compile::typeset(&cfg, &cli.outfile)?;
    let out = compile::deliver(&pdf, &cwd)?;
    info!(
        output = %out.display(),
        labels = sheet.labels,
        pages = sheet.pages,
        "done"
    );
    Ok(())
}
