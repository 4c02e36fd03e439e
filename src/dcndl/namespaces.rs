//! Lists the fixed set of namespaces used by OAI-PMH records carrying DC-NDL (Simple) metadata.
//!
//! As matching is performed on expanded names, the prefixes are only used for diagnostics and
//! to render type markers like `dcterms:URI`.

/// The OAI-PMH envelope (`record`, `header`, `identifier`, `datestamp`, `metadata`).
pub const OAI: &str = "http://www.openarchives.org/OAI/2.0/";

/// The Dublin Core elements (`title`, `creator`, `identifier`, ...).
pub const DC: &str = "http://purl.org/dc/elements/1.1/";

/// The Dublin Core terms (`alternative`, `extent`, `issued`, ...).
pub const DCTERMS: &str = "http://purl.org/dc/terms/";

/// The NDL specific terms (`seriesTitle`, `materialType`, `volume`, ...).
pub const DCNDL: &str = "http://ndl.go.jp/dcndl/terms/";

/// XML Schema instance, which provides the `type` attribute of typed values.
pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// RDF, which provides the `resource` attribute of resource links.
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// RDF Schema (`seeAlso`).
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";

/// OWL (`sameAs`).
pub const OWL: &str = "http://www.w3.org/2002/07/owl#";

/// FOAF (`thumbnail`).
pub const FOAF: &str = "http://xmlns.com/foaf/0.1/";

/// Maps the conventional prefixes to their namespace URIs.
pub const NAMESPACES: [(&str, &str); 9] = [
    ("oai", OAI),
    ("dc", DC),
    ("dcterms", DCTERMS),
    ("dcndl", DCNDL),
    ("xsi", XSI),
    ("rdf", RDF),
    ("rdfs", RDFS),
    ("owl", OWL),
    ("foaf", FOAF),
];

/// Determines the conventional prefix of a namespace URI.
///
/// # Example
/// ```
/// assert_eq!(opac::dcndl::namespaces::prefix("http://purl.org/dc/terms/"), Some("dcterms"));
/// assert_eq!(opac::dcndl::namespaces::prefix("urn:unknown"), None);
/// ```
pub fn prefix(uri: &str) -> Option<&'static str> {
    NAMESPACES
        .iter()
        .find(|(_, candidate)| *candidate == uri)
        .map(|(prefix, _)| *prefix)
}

#[cfg(test)]
mod tests {
    use crate::dcndl::namespaces::{prefix, NAMESPACES};
    use itertools::Itertools;

    #[test]
    fn prefixes_and_uris_are_unique() {
        for (prefix_name, namespace) in NAMESPACES.iter() {
            assert_eq!(prefix(namespace), Some(*prefix_name));
        }
        assert_eq!(NAMESPACES.iter().map(|(name, _)| name).unique().count(), NAMESPACES.len());
    }
}
