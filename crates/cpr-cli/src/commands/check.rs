use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use cpr_request::load_request;
use serde::Serialize;
use tracing::info;

use super::load_config;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Request document to decode.
    #[arg(long = "in")]
    pub input: PathBuf,
    /// Optional YAML codec configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CheckSummary<'a> {
    experiment_reference: &'a str,
    experiment_version: String,
    subjects: usize,
    treatments: usize,
    designs: Vec<&'a str>,
    measurements: Vec<&'a str>,
    fingerprint: String,
}

pub fn run(args: &CheckArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(args.config.as_ref())?;
    let request = load_request(&args.input, &config)?;
    let summary = CheckSummary {
        experiment_reference: &request.experiment_reference,
        experiment_version: request.experiment_version.to_string(),
        subjects: request.subjects.len(),
        treatments: request.treatments.len(),
        designs: request.designs.iter().map(|design| design.label()).collect(),
        measurements: request
            .measurements
            .iter()
            .map(|measurement| measurement.measurement_type())
            .collect(),
        fingerprint: request.fingerprint()?,
    };
    info!(path = %args.input.display(), "request document is valid");
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
