//! The experimental request container and its codec.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use cpr_core::{CodecConfig, NamedEntity, RequestError, Treatment, Version};
use cpr_design::fields;
use cpr_design::{
    decode_design_sequence, parse_document, tags, BlockDefinitionDecoder, DesignBlock, SymbolTable,
};

use crate::hash::stable_hash_string;
use crate::measurement::{expect_object, Measurement, MeasurementDecoder};

const EXPERIMENTAL_REQUEST: &str = "experimental_request";

/// A structured experimental request.
///
/// Subjects and treatments name the entities and factors that designs refer
/// to; designs are listed in dependency order so each one only refers to
/// designs before it; measurements refer to designs by label.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentalRequest {
    /// Challenge problem the request belongs to.
    pub challenge_problem: String,
    /// Name of the experiment reference document.
    pub experiment_reference: String,
    /// Location of the experiment reference document.
    pub experiment_reference_url: String,
    /// Version of the request.
    pub experiment_version: Version,
    /// Request this one was derived from, if any.
    pub derived_from: Option<String>,
    /// Entities available as subjects.
    pub subjects: Vec<NamedEntity>,
    /// Treatments available to designs.
    pub treatments: Vec<Treatment>,
    /// Labeled designs in dependency order.
    pub designs: Vec<Arc<DesignBlock>>,
    /// Requested measurements.
    pub measurements: Vec<Measurement>,
}

impl ExperimentalRequest {
    /// Creates an empty request with the given header fields.
    pub fn new(
        challenge_problem: impl Into<String>,
        experiment_reference: impl Into<String>,
        experiment_reference_url: impl Into<String>,
        experiment_version: Version,
    ) -> Self {
        Self {
            challenge_problem: challenge_problem.into(),
            experiment_reference: experiment_reference.into(),
            experiment_reference_url: experiment_reference_url.into(),
            experiment_version,
            derived_from: None,
            subjects: Vec::new(),
            treatments: Vec::new(),
            designs: Vec::new(),
            measurements: Vec::new(),
        }
    }

    /// Rebuilds the symbol table the request's references resolve against.
    pub fn symbol_table(&self) -> Result<SymbolTable, RequestError> {
        let mut symbols =
            SymbolTable::from_parts(self.subjects.iter().cloned(), self.treatments.iter().cloned())?;
        for design in &self.designs {
            symbols.insert_shared_design(Arc::clone(design))?;
        }
        Ok(symbols)
    }

    /// Returns the design with the given label.
    pub fn design(&self, label: &str) -> Option<&Arc<DesignBlock>> {
        self.designs.iter().find(|design| design.label() == label)
    }

    /// Stable content hash of the encoded request.
    ///
    /// Hashes the canonical JSON form, so key order does not matter and a
    /// magnitude written as `25.0` hashes the same as `25`. Requests that
    /// compare equal therefore share a fingerprint.
    pub fn fingerprint(&self) -> Result<String, RequestError> {
        stable_hash_string(self)
    }

    /// Decodes a request from a parsed JSON document.
    pub fn decode(node: &JsonValue, config: &CodecConfig) -> Result<Self, RequestError> {
        let map = expect_object(node, EXPERIMENTAL_REQUEST)?;
        let header = |field: &str| -> Result<String, RequestError> {
            fields::string(map, EXPERIMENTAL_REQUEST, field).map(str::to_string)
        };
        let challenge_problem = header("challenge_problem")?;
        let experiment_reference = header("experiment_reference")?;
        let experiment_reference_url = header("experiment_reference_url")?;
        let experiment_version = fields::record(
            fields::required(map, EXPERIMENTAL_REQUEST, "experiment_version")?,
            EXPERIMENTAL_REQUEST,
            "experiment_version",
        )?;
        let derived_from = fields::optional_string(map, EXPERIMENTAL_REQUEST, "derived_from")?
            .map(str::to_string);

        let subjects = records::<NamedEntity>(map, "subjects")?;
        let treatments = records::<Treatment>(map, "treatments")?;
        let mut symbols =
            SymbolTable::from_parts(subjects.iter().cloned(), treatments.iter().cloned())?;

        let design_nodes = fields::array(map, EXPERIMENTAL_REQUEST, "designs")?;
        let designs = decode_design_sequence(design_nodes, &mut symbols, config)?;

        let measurements = {
            let decoder = MeasurementDecoder::new(BlockDefinitionDecoder::with_config(
                &symbols,
                config.clone(),
            ));
            fields::array(map, EXPERIMENTAL_REQUEST, "measurements")?
                .iter()
                .map(|node| decoder.decode_measurement(node))
                .collect::<Result<Vec<_>, _>>()?
        };

        info!(
            experiment = %experiment_reference,
            subjects = subjects.len(),
            treatments = treatments.len(),
            designs = designs.len(),
            measurements = measurements.len(),
            "decoded experimental request"
        );
        Ok(Self {
            challenge_problem,
            experiment_reference,
            experiment_reference_url,
            experiment_version,
            derived_from,
            subjects,
            treatments,
            designs,
            measurements,
        })
    }

    /// Parses and decodes a request from JSON text.
    pub fn from_json_str(json: &str, config: &CodecConfig) -> Result<Self, RequestError> {
        let node = parse_document(json, config)?;
        Self::decode(&node, config)
    }

    /// Encodes the request as JSON text, indented when `pretty` is set.
    pub fn to_json_string(&self, pretty: bool) -> Result<String, RequestError> {
        let encoded = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        encoded.map_err(|err| RequestError::serde("encode-json", err))
    }
}

fn records<T: DeserializeOwned>(
    map: &fields::Object,
    field: &str,
) -> Result<Vec<T>, RequestError> {
    let items = fields::array(map, EXPERIMENTAL_REQUEST, field)?;
    debug!(field, count = items.len(), "decoding request records");
    items
        .iter()
        .map(|item| fields::record(item, EXPERIMENTAL_REQUEST, field))
        .collect()
}

impl Serialize for ExperimentalRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.derived_from.is_some() { 10 } else { 9 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(tags::OBJECT_TYPE, EXPERIMENTAL_REQUEST)?;
        map.serialize_entry("challenge_problem", &self.challenge_problem)?;
        map.serialize_entry("experiment_reference", &self.experiment_reference)?;
        map.serialize_entry("experiment_reference_url", &self.experiment_reference_url)?;
        map.serialize_entry("experiment_version", &self.experiment_version)?;
        if let Some(derived_from) = &self.derived_from {
            map.serialize_entry("derived_from", derived_from)?;
        }
        map.serialize_entry("subjects", &self.subjects)?;
        map.serialize_entry("treatments", &self.treatments)?;
        map.serialize_entry("designs", &Designs(&self.designs))?;
        map.serialize_entry("measurements", &self.measurements)?;
        map.end()
    }
}

struct Designs<'a>(&'a [Arc<DesignBlock>]);

impl Serialize for Designs<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(Arc::as_ref))
    }
}
