//! Loads all valid records from a DC-NDL XML file.
//!
//! The [RecordLoader] drives the [RawRecords](crate::dcndl::builder::RawRecords) iterator and
//! the [validator](crate::dcndl::validator). Records failing validation are skipped and counted,
//! whereas a missing file or malformed XML aborts the whole load.
//!
//! # Example
//! ```
//! use opac::dcndl::loader::RecordLoader;
//!
//! let data = r#"
//! <ListRecords xmlns="http://www.openarchives.org/OAI/2.0/"
//!              xmlns:dc="http://purl.org/dc/elements/1.1/">
//!     <record>
//!         <header>
//!             <identifier>oai:test:1</identifier>
//!             <datestamp>2020-01-01</datestamp>
//!         </header>
//!         <metadata><dc><dc:title>Valid</dc:title></dc></metadata>
//!     </record>
//!     <record>
//!         <header><identifier>oai:test:2</identifier></header>
//!     </record>
//! </ListRecords>
//! "#;
//!
//! let report = RecordLoader::default().load(data.as_bytes(), "inline").unwrap();
//! assert_eq!(report.records.len(), 1);
//! assert_eq!(report.skipped, 1);
//! ```
use crate::dcndl::builder::RawRecords;
use crate::dcndl::model::Record;
use crate::dcndl::validator::validate;
use anyhow::Context;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Contains the default number of rejections which are logged individually.
pub const DEFAULT_MAX_LOGGED_REJECTIONS: usize = 10;

/// Contains all valid records of an input along with the number of skipped ones.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// All valid records in document order.
    pub records: Vec<Record>,

    /// The number of records which failed validation.
    pub skipped: usize,
}

/// Counts the valid and skipped records of a streamed input.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// The number of records handed to the sink.
    pub valid: usize,

    /// The number of records which failed validation.
    pub skipped: usize,
}

/// Parses and validates XML inputs.
#[derive(Debug, Copy, Clone)]
pub struct RecordLoader {
    max_logged_rejections: usize,
}

impl Default for RecordLoader {
    fn default() -> Self {
        RecordLoader::new(DEFAULT_MAX_LOGGED_REJECTIONS)
    }
}

impl RecordLoader {
    /// Creates a loader which logs the first `max_logged_rejections` rejections individually.
    pub fn new(max_logged_rejections: usize) -> Self {
        RecordLoader {
            max_logged_rejections,
        }
    }

    /// Loads the file at the given path.
    pub fn load_file(&self, path: &Path) -> anyhow::Result<LoadReport> {
        if !path.is_file() {
            return Err(anyhow::anyhow!(
                "XML file not found at path: {}",
                path.display()
            ));
        }

        let file = File::open(path)
            .with_context(|| format!("Failed to open XML file: {}", path.display()))?;

        self.load(BufReader::new(file), &path.display().to_string())
    }

    /// Loads all records of the given input and collects the valid ones.
    pub fn load<B: BufRead>(&self, input: B, source_name: &str) -> anyhow::Result<LoadReport> {
        let mut records = Vec::new();
        let stats = self.stream(input, source_name, |record| records.push(record))?;

        Ok(LoadReport {
            records,
            skipped: stats.skipped,
        })
    }

    /// Hands each valid record of the given input to the sink.
    ///
    /// Records are passed on as soon as they are complete, so the input is never held in
    /// memory as a whole.
    pub fn stream<B: BufRead, F: FnMut(Record)>(
        &self,
        input: B,
        source_name: &str,
        mut sink: F,
    ) -> anyhow::Result<LoadStats> {
        log::info!("Starting XML parsing for: {}", source_name);

        let mut stats = LoadStats::default();
        let mut records = RawRecords::new(input);
        while let Some(raw) = records.next() {
            let raw = raw.with_context(|| {
                format!(
                    "Failed to parse XML data of {} within /{}",
                    source_name,
                    records.path()
                )
            })?;
            let identifier = raw.header.identifier.clone();
            match validate(raw) {
                Ok(record) => {
                    stats.valid += 1;
                    sink(record);
                }
                Err(error) => {
                    stats.skipped += 1;
                    if stats.skipped <= self.max_logged_rejections {
                        log::warn!(
                            "Skipping record {} in {}: {}",
                            identifier.as_deref().unwrap_or("(without identifier)"),
                            source_name,
                            error
                        );
                    }
                }
            }
        }

        log::info!(
            "Finished parsing {}. Found {} valid records.",
            source_name,
            stats.valid
        );
        if stats.skipped > 0 {
            log::warn!(
                "Skipped {} records of {} due to validation errors.",
                stats.skipped,
                source_name
            );
        }

        Ok(stats)
    }
}

/// Loads the given file using the default settings.
pub fn load_xml(path: &Path) -> anyhow::Result<LoadReport> {
    RecordLoader::default().load_file(path)
}

#[cfg(test)]
mod tests {
    use crate::dcndl::loader::{load_xml, RecordLoader};
    use crate::dcndl::model::TypedValue;
    use crate::testing::{record_xml, wrap_records, SCENARIO};
    use std::io::Write;

    #[test]
    fn scenario_yields_a_single_record() {
        let report = RecordLoader::default()
            .load(SCENARIO.as_bytes(), "scenario")
            .unwrap();
        assert_eq!(report.skipped, 0);
        assert_eq!(report.records.len(), 1);

        let dc = report.records[0].dc();
        assert_eq!(report.records[0].header.identifier, "oai:example:1");
        assert_eq!(dc.title, "Sample Book");
        assert_eq!(dc.creator, vec!["Smith, J.", "Doe, A."]);
        assert_eq!(dc.issued, vec![TypedValue::new("2020", Some("dcterms:W3CDTF"))]);
        assert_eq!(
            dc.identifier
                .contains(&TypedValue::new("oai:example:1", Some("dcterms:URI"))),
            true
        );
    }

    #[test]
    fn invalid_records_are_skipped() {
        let data = wrap_records(&format!(
            "{}{}{}",
            record_xml("oai:x:1", "One", &[]),
            "<record><header><identifier>oai:x:2</identifier>\
             <datestamp>2020-01-01</datestamp></header></record>",
            record_xml("oai:x:3", "Three", &[])
        ));

        let report = RecordLoader::new(0).load(data.as_bytes(), "test").unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(
            report
                .records
                .iter()
                .map(|record| record.dc().title.as_str())
                .collect::<Vec<_>>(),
            vec!["One", "Three"]
        );
    }

    #[test]
    fn streaming_counts_records() {
        let data = wrap_records(&format!(
            "{}{}",
            record_xml("oai:x:1", "One", &["A"]),
            record_xml("oai:x:2", "Two", &["B"])
        ));

        let mut seen = Vec::new();
        let stats = RecordLoader::default()
            .stream(data.as_bytes(), "test", |record| {
                seen.push(record.header.identifier)
            })
            .unwrap();

        assert_eq!(stats.valid, 2);
        assert_eq!(stats.skipped, 0);
        assert_eq!(seen, vec!["oai:x:1", "oai:x:2"]);
    }

    #[test]
    fn malformed_xml_fails_the_whole_load() {
        let mismatched = wrap_records("<record><metadata></metadat></record>");
        let error = RecordLoader::default()
            .load(mismatched.as_bytes(), "test")
            .unwrap_err();
        assert_eq!(
            format!("{}", error),
            "Failed to parse XML data of test within /oai:ListRecords/oai:record/oai:metadata"
        );

        let truncated = record_xml("oai:x:1", "One", &[]);
        let truncated = &truncated[..truncated.len() - 5];
        assert_eq!(
            RecordLoader::default()
                .load(wrap_records(truncated).as_bytes(), "test")
                .is_err(),
            true
        );
    }

    #[test]
    fn files_are_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCENARIO.as_bytes()).unwrap();

        let report = load_xml(file.path()).unwrap();
        assert_eq!(report.records.len(), 1);

        let missing = file.path().with_extension("missing");
        let error = load_xml(&missing).unwrap_err();
        assert_eq!(
            error.to_string().starts_with("XML file not found at path:"),
            true
        );
    }
}
