use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use cpr_request::load_request;

use super::load_config;

#[derive(Args, Debug)]
pub struct FingerprintArgs {
    /// Request document to hash.
    #[arg(long = "in")]
    pub input: PathBuf,
    /// Optional YAML codec configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &FingerprintArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(args.config.as_ref())?;
    let request = load_request(&args.input, &config)?;
    println!("{}", request.fingerprint()?);
    Ok(())
}
