//! Print the OpenAPI document for the JSON API.
//!
//! ```text
//! openapi-dump --format yaml --output openapi.yaml
//! ```

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Context, Result};
use entry_watch::ApiDoc;
use utoipa::OpenApi;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "openapi-dump", about = "Print the entry-watch OpenAPI document")]
struct Args {
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
    /// Write to this file instead of standard output.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let doc = ApiDoc::openapi();
    let rendered = match args.format {
        Format::Json => doc.to_pretty_json().wrap_err("render OpenAPI as JSON")?,
        Format::Yaml => doc.to_yaml().wrap_err("render OpenAPI as YAML")?,
    };

    match args.output {
        Some(path) => std::fs::write(&path, rendered)
            .wrap_err_with(|| format!("write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{rendered}").wrap_err("write to stdout")?;
        }
    }
    Ok(())
}
