#![deny(missing_docs)]
#![doc = "Experimental request assembly: samples, controls, measurements and the request container."]

pub mod hash;
pub mod io;
mod measurement;
mod request;
pub mod serde;

pub use hash::stable_hash_string;
pub use io::{load_request, write_document, write_request};
pub use measurement::{Control, Measurement, MeasurementDecoder, Sample};
pub use request::ExperimentalRequest;
