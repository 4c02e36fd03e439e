//! Provides the pipeline which turns DC-NDL (Simple) XML into validated records.
//!
//! The pipeline is strictly one-directional:
//!
//! 1. the [xml](crate::xml) module reports namespace aware events,
//! 2. the [builder] assembles a [RawRecord](raw::RawRecord) per `oai:record`, using the
//!    [fields] table to decide where each element goes,
//! 3. the [validator] turns it into a [Record](model::Record) or rejects it,
//! 4. the [loader] drives all of this for a file and counts the rejections.
//!
//! Everything in here is synchronous and keeps at most one record in memory at a time.
pub mod builder;
pub mod fields;
pub mod loader;
pub mod model;
pub mod namespaces;
pub mod raw;
pub mod validator;

pub use loader::{load_xml, LoadReport, LoadStats, RecordLoader};
pub use model::{DcndlSimple, Header, Metadata, Record, ResourceLink, TypedValue};
pub use validator::ValidationError;
