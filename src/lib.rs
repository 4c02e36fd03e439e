//! Opac is a library for ingesting, storing and searching bibliographic records which are
//! provided as **DC-NDL (Simple)** metadata within **OAI-PMH** XML exports.
//!
//! # Introduction
//! The National Diet Library publishes its catalog as OAI-PMH record lists whose payload follows
//! the DC-NDL profile of Dublin Core. These files easily reach several hundred megabytes,
//! therefore **Opac** never builds a document tree. Instead a namespace aware event stream is
//! turned into one record at a time, which is validated and then handed on to a store.
//! Invalid records are skipped and counted, whereas malformed XML aborts processing of the file.
//!
//! # Modules
//! * **XML**: A thin layer above **quick_xml** which reports elements and attributes by their
//!   expanded names. See [crate::xml].
//! * **DC-NDL**: The record builder, the field mapping table, the validator and the loader
//!   which ties them together. See [crate::dcndl].
//! * **Store**: A normalized in-memory catalog with get-or-create semantics for creators,
//!   batch sessions which can be committed or rolled back, JSON snapshots and a paginated
//!   substring search. See [crate::store].
//! * **Populate**: Loads all XML files of a directory into the catalog. See [crate::populate].
//! * **Config**: Reads the YAML settings of the command line tool. See [crate::config].
//!
//! # Example
//! ```
//! use opac::dcndl::loader::RecordLoader;
//! use opac::store::{Catalog, SearchQuery};
//!
//! let data = r#"
//! <ListRecords xmlns="http://www.openarchives.org/OAI/2.0/"
//!              xmlns:dc="http://purl.org/dc/elements/1.1/">
//!     <record>
//!         <header>
//!             <identifier>oai:test:1</identifier>
//!             <datestamp>2020-01-01T00:00:00Z</datestamp>
//!         </header>
//!         <metadata><dc>
//!             <dc:title>Sample Book</dc:title>
//!             <dc:creator>Smith, J.</dc:creator>
//!         </dc></metadata>
//!     </record>
//! </ListRecords>
//! "#;
//!
//! let report = RecordLoader::default().load(data.as_bytes(), "inline").unwrap();
//!
//! let mut catalog = Catalog::new();
//! {
//!     let mut session = catalog.session();
//!     for record in &report.records {
//!         let _ = session.create_record(record).unwrap();
//!     }
//!     let _ = session.commit();
//! }
//!
//! let page = catalog.search(&SearchQuery::default().with_creator("smith")).unwrap();
//! assert_eq!(page.total_items, 1);
//! assert_eq!(page.items[0].dc().title, "Sample Book");
//! ```
#![deny(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_results
)]
use simplelog::{format_description, ConfigBuilder, LevelFilter, SimpleLogger};
use std::sync::Once;

pub mod config;
pub mod dcndl;
pub mod populate;
pub mod store;
pub mod xml;

/// Contains the version of the Opac library.
pub const OPAC_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initializes the logging system.
///
/// This can safely be invoked several times, only the first call has an effect.
pub fn init_logging() {
    static INIT_LOGGING: Once = Once::new();

    INIT_LOGGING.call_once(|| {
        if let Err(error) = SimpleLogger::init(
            LevelFilter::Debug,
            ConfigBuilder::new()
                .set_time_format_custom(format_description!(
                    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]"
                ))
                .set_thread_level(LevelFilter::Trace)
                .set_target_level(LevelFilter::Error)
                .set_location_level(LevelFilter::Trace)
                .build(),
        ) {
            panic!("Failed to initialize logging system: {}", error);
        }
    });
}

#[cfg(test)]
mod testing {
    /// Executes async code within a single threaded tokio runtime.
    pub fn test_async<F: std::future::Future>(future: F) {
        use tokio::runtime;

        let rt = runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let _ = rt.block_on(future);
    }

    /// Contains a single complete record with two creators and a typed issue date.
    pub const SCENARIO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListRecords xmlns="http://www.openarchives.org/OAI/2.0/"
             xmlns:dc="http://purl.org/dc/elements/1.1/"
             xmlns:dcterms="http://purl.org/dc/terms/"
             xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <record>
    <header>
      <identifier>oai:example:1</identifier>
      <datestamp>2020-01-01T00:00:00Z</datestamp>
    </header>
    <metadata>
      <dc>
        <dc:title>Sample Book</dc:title>
        <dc:creator>Smith, J.</dc:creator>
        <dc:creator>Doe, A.</dc:creator>
        <dcterms:issued xsi:type="dcterms:W3CDTF">2020</dcterms:issued>
      </dc>
    </metadata>
  </record>
</ListRecords>
"#;

    /// Wraps the given records into a list which declares all DC-NDL namespaces. The OAI
    /// namespace is the default one.
    pub fn wrap_records(records: &str) -> String {
        format!(
            r#"<ListRecords xmlns="http://www.openarchives.org/OAI/2.0/"
                 xmlns:dc="http://purl.org/dc/elements/1.1/"
                 xmlns:dcterms="http://purl.org/dc/terms/"
                 xmlns:dcndl="http://ndl.go.jp/dcndl/terms/"
                 xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
                 xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                 xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#"
                 xmlns:owl="http://www.w3.org/2002/07/owl#"
                 xmlns:foaf="http://xmlns.com/foaf/0.1/">{}</ListRecords>"#,
            records
        )
    }

    /// Renders a valid record with the given identifier, title and creators.
    pub fn record_xml(identifier: &str, title: &str, creators: &[&str]) -> String {
        let creators: String = creators
            .iter()
            .map(|creator| format!("<dc:creator>{}</dc:creator>", creator))
            .collect();

        format!(
            "<record><header><identifier>{}</identifier>\
             <datestamp>2020-01-01T00:00:00Z</datestamp></header>\
             <metadata><dc><dc:title>{}</dc:title>{}</dc></metadata></record>",
            identifier, title, creators
        )
    }
}
