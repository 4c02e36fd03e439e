//! Contains the untyped record being assembled by the
//! [RecordBuilder](crate::dcndl::builder::RecordBuilder).
//!
//! Everything in here is optional, as the XML data might lack any element. Enforcing required
//! fields is left to the [validator](crate::dcndl::validator).
use crate::dcndl::model::{ResourceLink, TypedValue};

/// Contains the header fields as found in the XML data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawHeader {
    /// The text of `oai:identifier` (last one wins).
    pub identifier: Option<String>,

    /// The text of `oai:datestamp` (last one wins).
    pub datestamp: Option<String>,
}

/// Contains the DC-NDL fields as found in the XML data.
///
/// See [FIELD_TABLE](crate::dcndl::fields::FIELD_TABLE) for which element ends up in which field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct RawDc {
    pub title: Option<String>,
    pub publisher: Option<String>,
    pub alternative: Option<String>,
    pub series_title: Option<String>,
    pub date: Option<String>,
    pub language: Option<String>,
    pub extent: Option<String>,
    pub material_type: Option<String>,
    pub access_rights: Option<String>,
    pub title_transcription: Option<String>,
    pub volume: Option<String>,
    pub creator: Vec<String>,
    pub identifier: Vec<TypedValue>,
    pub publication_place: Vec<TypedValue>,
    pub issued: Vec<TypedValue>,
    pub subject: Vec<TypedValue>,
    pub see_also: Vec<ResourceLink>,
    pub same_as: Vec<ResourceLink>,
    pub thumbnail: Vec<ResourceLink>,
}

/// Represents a record which has been read completely but not yet validated.
///
/// Both parts are created along with the record itself, so that a record without any header or
/// metadata element simply yields empty parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    /// The OAI header.
    pub header: RawHeader,

    /// The `metadata/dc` payload.
    pub dc: RawDc,
}
