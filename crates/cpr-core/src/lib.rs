#![deny(missing_docs)]
#![doc = "Leaf value types, shared errors and codec settings for structured experimental requests."]

mod attribute;
pub mod config;
mod entity;
pub mod errors;
mod treatment;
mod unit;
mod value;
pub mod version;

pub use attribute::Attribute;
pub use config::CodecConfig;
pub use entity::NamedEntity;
pub use errors::{ErrorInfo, RequestError, SymbolKind};
pub use treatment::Treatment;
pub use unit::Unit;
pub use value::{Magnitude, Value};
pub use version::Version;
