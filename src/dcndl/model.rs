//! Contains the validated, strongly typed record model.
//!
//! A [Record] is only ever created by the [validator](crate::dcndl::validator) (or read back
//! from the [Catalog](crate::store::Catalog)) and therefore always carries a header identifier,
//! a parsed datestamp, a title and at least one identifier.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a value which is annotated with an optional type taken from `xsi:type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypedValue {
    /// Contains the (trimmed) text of the element.
    pub value: String,

    /// Contains the type discriminator like `dcndl:ISBN` or `dcterms:W3CDTF` if present.
    #[serde(rename = "type")]
    pub value_type: Option<String>,
}

impl TypedValue {
    /// Creates a new value with the given type.
    pub fn new(value: impl Into<String>, value_type: Option<&str>) -> Self {
        TypedValue {
            value: value.into(),
            value_type: value_type.map(str::to_owned),
        }
    }

    /// Determines if this value carries the given type.
    pub fn is_of_type(&self, value_type: &str) -> bool {
        self.value_type.as_deref() == Some(value_type)
    }
}

/// Represents a link to a resource taken from `rdf:resource`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceLink {
    /// Contains the URI of the linked resource.
    pub resource: String,
}

impl ResourceLink {
    /// Creates a new link to the given resource.
    pub fn new(resource: impl Into<String>) -> Self {
        ResourceLink {
            resource: resource.into(),
        }
    }
}

/// Contains the OAI-PMH header of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// The OAI identifier of the record. This is never empty.
    pub identifier: String,

    /// The timestamp of the last modification of the record.
    pub datestamp: DateTime<Utc>,
}

/// Contains the DC-NDL (Simple) metadata of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DcndlSimple {
    /// The title (`dc:title`).
    pub title: String,

    /// All identifiers (`dc:identifier`) including the OAI identifier typed as `dcterms:URI`.
    /// This is never empty.
    pub identifier: Vec<TypedValue>,

    /// All creators (`dc:creator`) in document order.
    #[serde(default)]
    pub creator: Vec<String>,

    /// The publisher (`dc:publisher`).
    pub publisher: Option<String>,

    /// An alternative title (`dcterms:alternative`).
    pub alternative: Option<String>,

    /// The title of the series (`dcndl:seriesTitle`).
    pub series_title: Option<String>,

    /// A free form date (`dc:date`).
    pub date: Option<String>,

    /// The language code (`dc:language`).
    pub language: Option<String>,

    /// The extent like number of pages and size (`dcterms:extent`).
    pub extent: Option<String>,

    /// The material type (`dcndl:materialType`).
    pub material_type: Option<String>,

    /// The access rights (`dcterms:accessRights`).
    pub access_rights: Option<String>,

    /// The transcription (reading) of the title (`dcndl:titleTranscription`).
    pub title_transcription: Option<String>,

    /// The volume (`dcndl:volume`).
    pub volume: Option<String>,

    /// All places of publication (`dcndl:publicationPlace`).
    #[serde(default)]
    pub publication_place: Vec<TypedValue>,

    /// All issue dates (`dcterms:issued`).
    #[serde(default)]
    pub issued: Vec<TypedValue>,

    /// All subjects (`dc:subject`).
    #[serde(default)]
    pub subject: Vec<TypedValue>,

    /// All related resources (`rdfs:seeAlso`).
    #[serde(default)]
    pub see_also: Vec<ResourceLink>,

    /// All equivalent resources (`owl:sameAs`).
    #[serde(default)]
    pub same_as: Vec<ResourceLink>,

    /// All thumbnails (`foaf:thumbnail`).
    #[serde(default)]
    pub thumbnail: Vec<ResourceLink>,
}

/// Wraps the metadata payload of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// The DC-NDL (Simple) payload.
    pub dc: DcndlSimple,
}

/// Represents a validated bibliographic record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// The OAI-PMH header.
    pub header: Header,

    /// The metadata payload.
    pub metadata: Metadata,
}

impl Record {
    /// Provides a shortcut to the DC-NDL payload.
    pub fn dc(&self) -> &DcndlSimple {
        &self.metadata.dc
    }
}
