//! Maps DC-NDL elements onto the fields of a [RawDc] record.
//!
//! Each supported element is listed exactly once in [FIELD_TABLE] along with its
//! [MergePolicy]. The policy variant carries the destination field, so that a field can never be
//! paired with a policy which doesn't fit its type (e.g. a link list receiving plain text).
//!
//! # Example
//! ```
//! use opac::dcndl::fields::lookup;
//! use opac::dcndl::namespaces::{DC, DCTERMS};
//! use opac::dcndl::raw::RawDc;
//! use opac::xml::Attributes;
//!
//! let mut dc = RawDc::default();
//! lookup(Some(DC), "title").unwrap().policy.apply(&mut dc, "First", &Attributes::default());
//! lookup(Some(DC), "title").unwrap().policy.apply(&mut dc, "Second", &Attributes::default());
//! assert_eq!(dc.title.as_deref(), Some("Second"));
//!
//! // Names are matched by namespace and local name...
//! assert_eq!(lookup(Some(DCTERMS), "title").is_none(), true);
//! assert_eq!(lookup(None, "title").is_none(), true);
//! ```
use crate::dcndl::model::{ResourceLink, TypedValue};
use crate::dcndl::namespaces::{DC, DCNDL, DCTERMS, FOAF, OWL, RDF, RDFS, XSI};
use crate::dcndl::raw::RawDc;
use crate::xml::Attributes;
use std::collections::HashMap;

/// Enumerates all single valued text fields.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ScalarField {
    Title,
    Alternative,
    SeriesTitle,
    Publisher,
    Date,
    Language,
    Extent,
    MaterialType,
    AccessRights,
    TitleTranscription,
    Volume,
}

impl ScalarField {
    fn slot(self, dc: &mut RawDc) -> &mut Option<String> {
        match self {
            ScalarField::Title => &mut dc.title,
            ScalarField::Alternative => &mut dc.alternative,
            ScalarField::SeriesTitle => &mut dc.series_title,
            ScalarField::Publisher => &mut dc.publisher,
            ScalarField::Date => &mut dc.date,
            ScalarField::Language => &mut dc.language,
            ScalarField::Extent => &mut dc.extent,
            ScalarField::MaterialType => &mut dc.material_type,
            ScalarField::AccessRights => &mut dc.access_rights,
            ScalarField::TitleTranscription => &mut dc.title_transcription,
            ScalarField::Volume => &mut dc.volume,
        }
    }
}

/// Enumerates all fields which collect plain strings.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum StringListField {
    Creator,
}

impl StringListField {
    fn slot(self, dc: &mut RawDc) -> &mut Vec<String> {
        match self {
            StringListField::Creator => &mut dc.creator,
        }
    }
}

/// Enumerates all fields which collect [TypedValue]s.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum TypedListField {
    Identifier,
    PublicationPlace,
    Issued,
    Subject,
}

impl TypedListField {
    fn slot(self, dc: &mut RawDc) -> &mut Vec<TypedValue> {
        match self {
            TypedListField::Identifier => &mut dc.identifier,
            TypedListField::PublicationPlace => &mut dc.publication_place,
            TypedListField::Issued => &mut dc.issued,
            TypedListField::Subject => &mut dc.subject,
        }
    }
}

/// Enumerates all fields which collect [ResourceLink]s.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum LinkListField {
    SeeAlso,
    SameAs,
    Thumbnail,
}

impl LinkListField {
    fn slot(self, dc: &mut RawDc) -> &mut Vec<ResourceLink> {
        match self {
            LinkListField::SeeAlso => &mut dc.see_also,
            LinkListField::SameAs => &mut dc.same_as,
            LinkListField::Thumbnail => &mut dc.thumbnail,
        }
    }
}

/// Determines how the text and attributes of an element are merged into a record.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MergePolicy {
    /// Stores the trimmed text, replacing any previous value.
    Overwrite(ScalarField),

    /// Appends the trimmed text.
    AppendString(StringListField),

    /// Appends the trimmed text along with the `xsi:type` attribute (if present).
    AppendTyped(TypedListField),

    /// Appends the `rdf:resource` attribute. Elements without (or with an empty) resource are
    /// skipped.
    AppendLink(LinkListField),
}

impl MergePolicy {
    /// Merges the given text and attributes into the record.
    pub fn apply(&self, dc: &mut RawDc, text: &str, attributes: &Attributes) {
        match *self {
            MergePolicy::Overwrite(field) => *field.slot(dc) = Some(text.trim().to_owned()),
            MergePolicy::AppendString(field) => field.slot(dc).push(text.trim().to_owned()),
            MergePolicy::AppendTyped(field) => field
                .slot(dc)
                .push(TypedValue::new(text.trim(), attributes.get(XSI, "type"))),
            MergePolicy::AppendLink(field) => {
                if let Some(resource) = attributes.get(RDF, "resource").filter(|r| !r.is_empty()) {
                    field.slot(dc).push(ResourceLink::new(resource));
                }
            }
        }
    }
}

/// Binds an element name to its merge policy.
#[derive(Debug)]
pub struct FieldMapping {
    /// The namespace URI of the element.
    pub namespace: &'static str,

    /// The local name of the element.
    pub local_name: &'static str,

    /// The policy to apply once the element ends.
    pub policy: MergePolicy,
}

const fn mapping(
    namespace: &'static str,
    local_name: &'static str,
    policy: MergePolicy,
) -> FieldMapping {
    FieldMapping {
        namespace,
        local_name,
        policy,
    }
}

/// Lists all supported DC-NDL elements.
pub static FIELD_TABLE: [FieldMapping; 19] = [
    mapping(DC, "title", MergePolicy::Overwrite(ScalarField::Title)),
    mapping(DCTERMS, "alternative", MergePolicy::Overwrite(ScalarField::Alternative)),
    mapping(DCNDL, "seriesTitle", MergePolicy::Overwrite(ScalarField::SeriesTitle)),
    mapping(DC, "creator", MergePolicy::AppendString(StringListField::Creator)),
    mapping(DC, "publisher", MergePolicy::Overwrite(ScalarField::Publisher)),
    mapping(DC, "date", MergePolicy::Overwrite(ScalarField::Date)),
    mapping(DC, "language", MergePolicy::Overwrite(ScalarField::Language)),
    mapping(DCTERMS, "extent", MergePolicy::Overwrite(ScalarField::Extent)),
    mapping(DCNDL, "materialType", MergePolicy::Overwrite(ScalarField::MaterialType)),
    mapping(DCTERMS, "accessRights", MergePolicy::Overwrite(ScalarField::AccessRights)),
    mapping(
        DCNDL,
        "titleTranscription",
        MergePolicy::Overwrite(ScalarField::TitleTranscription),
    ),
    mapping(DCNDL, "volume", MergePolicy::Overwrite(ScalarField::Volume)),
    mapping(DC, "identifier", MergePolicy::AppendTyped(TypedListField::Identifier)),
    mapping(
        DCNDL,
        "publicationPlace",
        MergePolicy::AppendTyped(TypedListField::PublicationPlace),
    ),
    mapping(DCTERMS, "issued", MergePolicy::AppendTyped(TypedListField::Issued)),
    mapping(DC, "subject", MergePolicy::AppendTyped(TypedListField::Subject)),
    mapping(RDFS, "seeAlso", MergePolicy::AppendLink(LinkListField::SeeAlso)),
    mapping(OWL, "sameAs", MergePolicy::AppendLink(LinkListField::SameAs)),
    mapping(FOAF, "thumbnail", MergePolicy::AppendLink(LinkListField::Thumbnail)),
];

lazy_static::lazy_static! {
    static ref INDEX: HashMap<&'static str, HashMap<&'static str, &'static FieldMapping>> = {
        let mut index: HashMap<&'static str, HashMap<&'static str, &'static FieldMapping>> =
            HashMap::new();
        for field in FIELD_TABLE.iter() {
            let _ = index
                .entry(field.namespace)
                .or_default()
                .insert(field.local_name, field);
        }

        index
    };
}

/// Finds the mapping for the element with the given expanded name.
pub fn lookup(namespace: Option<&str>, local_name: &str) -> Option<&'static FieldMapping> {
    INDEX
        .get(namespace?)
        .and_then(|fields| fields.get(local_name))
        .copied()
}

#[cfg(test)]
mod tests {
    use crate::dcndl::fields::{lookup, MergePolicy, FIELD_TABLE};
    use crate::dcndl::model::{ResourceLink, TypedValue};
    use crate::dcndl::namespaces::{DC, DCTERMS, FOAF, OWL, RDF, RDFS, XSI};
    use crate::dcndl::raw::RawDc;
    use crate::xml::{Attributes, ExpandedName};

    fn attribute(namespace: &str, local_name: &str, value: &str) -> Attributes {
        let mut attributes = Attributes::default();
        attributes.push(
            ExpandedName::new(Some(namespace.to_owned()), local_name),
            value,
        );
        attributes
    }

    #[test]
    fn every_table_entry_can_be_found() {
        for field in FIELD_TABLE.iter() {
            let found = lookup(Some(field.namespace), field.local_name).unwrap();
            assert_eq!(found.policy, field.policy);
        }
    }

    #[test]
    fn typed_values_take_their_type_from_xsi() {
        let mut dc = RawDc::default();
        let policy = lookup(Some(DCTERMS), "issued").unwrap().policy;
        policy.apply(&mut dc, " 2020 ", &attribute(XSI, "type", "dcterms:W3CDTF"));
        // An attribute named "type" in another namespace is not a type marker...
        policy.apply(&mut dc, "2021", &attribute(DC, "type", "bogus"));

        assert_eq!(
            dc.issued,
            vec![
                TypedValue::new("2020", Some("dcterms:W3CDTF")),
                TypedValue::new("2021", None)
            ]
        );
    }

    #[test]
    fn links_require_a_resource() {
        let mut dc = RawDc::default();
        let see_also = lookup(Some(RDFS), "seeAlso").unwrap().policy;
        see_also.apply(&mut dc, "", &Attributes::default());
        see_also.apply(&mut dc, "", &attribute(RDF, "resource", ""));
        see_also.apply(&mut dc, "ignored", &attribute(RDF, "resource", "http://a"));
        lookup(Some(OWL), "sameAs")
            .unwrap()
            .policy
            .apply(&mut dc, "", &attribute(RDF, "resource", "http://b"));
        lookup(Some(FOAF), "thumbnail")
            .unwrap()
            .policy
            .apply(&mut dc, "", &attribute(RDF, "resource", "http://c"));

        assert_eq!(dc.see_also, vec![ResourceLink::new("http://a")]);
        assert_eq!(dc.same_as, vec![ResourceLink::new("http://b")]);
        assert_eq!(dc.thumbnail, vec![ResourceLink::new("http://c")]);
    }

    #[test]
    fn creators_accumulate_in_order() {
        let mut dc = RawDc::default();
        let policy = lookup(Some(DC), "creator").unwrap().policy;
        assert_eq!(matches!(policy, MergePolicy::AppendString(_)), true);
        policy.apply(&mut dc, "  A  ", &Attributes::default());
        policy.apply(&mut dc, "B", &Attributes::default());

        assert_eq!(dc.creator, vec!["A".to_owned(), "B".to_owned()]);
    }
}
