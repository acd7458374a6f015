//! Samples, controls and measurements.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::trace;

use cpr_core::{NamedEntity, RequestError};
use cpr_design::fields::{self, Object};
use cpr_design::{tags, BlockDefinitionDecoder, BlockReference, SymbolTable, TreatmentReference};

pub(crate) const SAMPLE: &str = "sample";
pub(crate) const CONTROL: &str = "control";
pub(crate) const MEASUREMENT: &str = "measurement";

/// An entity together with the treatments applied to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    subject: NamedEntity,
    treatments: Vec<TreatmentReference>,
}

impl Sample {
    /// Creates a sample.
    pub fn new(subject: NamedEntity, treatments: Vec<TreatmentReference>) -> Self {
        Self {
            subject,
            treatments,
        }
    }

    /// Returns the subject entity.
    pub fn subject(&self) -> &NamedEntity {
        &self.subject
    }

    /// Returns the applied treatments in order.
    pub fn treatments(&self) -> &[TreatmentReference] {
        &self.treatments
    }
}

/// A named sample used as a measurement control.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    name: String,
    sample: Sample,
}

impl Control {
    /// Creates a control.
    pub fn new(name: impl Into<String>, sample: Sample) -> Self {
        Self {
            name: name.into(),
            sample,
        }
    }

    /// Returns the control name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the control sample.
    pub fn sample(&self) -> &Sample {
        &self.sample
    }
}

/// A measurement of type `measurement_type` applied to the samples of a design.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    measurement_type: String,
    block: BlockReference,
    controls: Vec<Control>,
    performers: Vec<String>,
}

impl Measurement {
    /// Creates a measurement without controls.
    pub fn new(
        measurement_type: impl Into<String>,
        block: BlockReference,
        performers: Vec<String>,
    ) -> Self {
        Self {
            measurement_type: measurement_type.into(),
            block,
            controls: Vec::new(),
            performers,
        }
    }

    /// Attaches controls.
    pub fn with_controls(mut self, controls: Vec<Control>) -> Self {
        self.controls = controls;
        self
    }

    /// Returns the measurement type, such as `FLOW` or `RNA_SEQ`.
    pub fn measurement_type(&self) -> &str {
        &self.measurement_type
    }

    /// Returns the measured design.
    pub fn block(&self) -> &BlockReference {
        &self.block
    }

    /// Returns the controls.
    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// Returns the performers asked to run the measurement.
    pub fn performers(&self) -> &[String] {
        &self.performers
    }
}

impl Serialize for Sample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.treatments.is_empty() { 2 } else { 3 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(tags::OBJECT_TYPE, SAMPLE)?;
        map.serialize_entry("subject", self.subject.name())?;
        if !self.treatments.is_empty() {
            map.serialize_entry("treatments", &self.treatments)?;
        }
        map.end()
    }
}

impl Serialize for Control {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(tags::OBJECT_TYPE, CONTROL)?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("sample", &self.sample)?;
        map.end()
    }
}

impl Serialize for Measurement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.controls.is_empty() { 4 } else { 5 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(tags::OBJECT_TYPE, MEASUREMENT)?;
        map.serialize_entry("type", &self.measurement_type)?;
        map.serialize_entry("block", &self.block)?;
        if !self.controls.is_empty() {
            map.serialize_entry("controls", &self.controls)?;
        }
        map.serialize_entry("performers", &self.performers)?;
        map.end()
    }
}

/// Decodes samples, controls and measurements against a symbol table.
///
/// Unlike design blocks these records only ever appear in fixed positions of
/// a request, so every call is strict.
#[derive(Debug, Clone)]
pub struct MeasurementDecoder<'a> {
    blocks: BlockDefinitionDecoder<'a>,
}

impl<'a> MeasurementDecoder<'a> {
    /// Wraps a block decoder; its symbol table and settings are reused.
    pub fn new(blocks: BlockDefinitionDecoder<'a>) -> Self {
        Self { blocks }
    }

    /// Creates a decoder with default settings.
    pub fn with_symbols(symbols: &'a SymbolTable) -> Self {
        Self::new(BlockDefinitionDecoder::new(symbols))
    }

    /// Decodes a `sample` record.
    pub fn decode_sample(&self, node: &JsonValue) -> Result<Sample, RequestError> {
        let map = expect_object(node, SAMPLE)?;
        let subject = fields::string(map, SAMPLE, "subject")?;
        let subject = self.blocks.symbols().entity(subject)?.clone();
        let treatments = fields::optional_array(map, SAMPLE, "treatments")?
            .iter()
            .map(|treatment| self.blocks.decode_treatment_reference(treatment))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Sample::new(subject, treatments))
    }

    /// Decodes a `control` record.
    pub fn decode_control(&self, node: &JsonValue) -> Result<Control, RequestError> {
        let map = expect_object(node, CONTROL)?;
        let name = fields::string(map, CONTROL, "name")?;
        let sample = self.decode_sample(fields::required(map, CONTROL, "sample")?)?;
        Ok(Control::new(name, sample))
    }

    /// Decodes a `measurement` record.
    pub fn decode_measurement(&self, node: &JsonValue) -> Result<Measurement, RequestError> {
        let map = expect_object(node, MEASUREMENT)?;
        let measurement_type = fields::string(map, MEASUREMENT, "type")?;
        let block = self
            .blocks
            .decode_block_reference(fields::required(map, MEASUREMENT, "block")?)?;
        let controls = fields::optional_array(map, MEASUREMENT, "controls")?
            .iter()
            .map(|control| self.decode_control(control))
            .collect::<Result<Vec<_>, _>>()?;
        let performers = fields::array(map, MEASUREMENT, "performers")?
            .iter()
            .map(|performer| {
                performer
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| {
                        RequestError::invalid_field(MEASUREMENT, "performers", "an array of strings")
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        trace!(
            measurement_type,
            block = block.label(),
            controls = controls.len(),
            "decoded measurement"
        );
        Ok(Measurement::new(measurement_type, block, performers).with_controls(controls))
    }
}

/// Returns the object behind `node` when it is tagged with `object_type`.
pub(crate) fn expect_object<'v>(
    node: &'v JsonValue,
    object_type: &str,
) -> Result<&'v Object, RequestError> {
    match node.as_object() {
        Some(map) if fields::tag_of(node, tags::OBJECT_TYPE) == Some(object_type) => Ok(map),
        _ => Err(RequestError::unexpected(object_type, fields::describe(node))),
    }
}
