use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use cpr_core::{RequestError, SymbolKind};
use cpr_design::{to_json_string, to_json_string_pretty, BlockFolder, Normalizer};
use cpr_request::{load_request, write_document};
use tracing::debug;

use super::load_config;

#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Request document holding the design.
    #[arg(long = "in")]
    pub input: PathBuf,
    /// Label of the design block to normalize.
    #[arg(long)]
    pub design: String,
    /// Leave block references in place instead of inlining them.
    #[arg(long)]
    pub keep_references: bool,
    /// Optional YAML codec configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Write the result here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &NormalizeArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(args.config.as_ref())?;
    let request = load_request(&args.input, &config)?;
    let design = request
        .design(&args.design)
        .ok_or_else(|| RequestError::unresolved(SymbolKind::Design, args.design.as_str()))?;

    let mut normalizer = Normalizer::with_config(&config).inline_references(!args.keep_references);
    let normalized = normalizer.fold_design(design)?;
    debug!(label = normalized.label(), "normalized design block");

    match &args.out {
        Some(path) => write_document(path, &normalized, &config)?,
        None => {
            let text = if config.pretty {
                to_json_string_pretty(&normalized)?
            } else {
                to_json_string(&normalized)?
            };
            println!("{text}");
        }
    }
    Ok(())
}
