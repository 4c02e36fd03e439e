//! Assembles [RawRecord]s from a stream of XML events.
//!
//! The [RecordBuilder] is a small state machine which is fed with start, end and character
//! events. Whenever an `oai:record` element is closed, the completed record is handed out.
//! Elements outside of a record as well as unknown elements within a record are ignored.
//!
//! Records can either be pushed into a sink using [parse_records] or pulled one by one via
//! [RawRecords]:
//!
//! ```
//! use opac::dcndl::builder::RawRecords;
//!
//! let data = r#"
//! <ListRecords xmlns="http://www.openarchives.org/OAI/2.0/"
//!              xmlns:dc="http://purl.org/dc/elements/1.1/">
//!     <record>
//!         <header><identifier>oai:test:1</identifier></header>
//!         <metadata><dc><dc:title>First</dc:title></dc></metadata>
//!     </record>
//!     <record>
//!         <metadata><dc><dc:title>Second</dc:title></dc></metadata>
//!     </record>
//! </ListRecords>
//! "#;
//!
//! let titles: Vec<_> = RawRecords::new(data.as_bytes())
//!     .map(|record| record.unwrap().dc.title)
//!     .collect();
//! assert_eq!(titles, vec![Some("First".to_owned()), Some("Second".to_owned())]);
//! ```
use crate::dcndl::fields;
use crate::dcndl::model::TypedValue;
use crate::dcndl::namespaces::{self, OAI};
use crate::dcndl::raw::RawRecord;
use crate::xml::{
    parse, Attributes, ContentHandler, ExpandedName, PullReader, XmlError, XmlEvent,
};
use std::io::BufRead;

/// Contains the type assigned to the OAI identifier once it is copied into the identifier list.
pub const HEADER_IDENTIFIER_TYPE: &str = "dcterms:URI";

/// Keeps the state required to turn XML events into records.
#[derive(Default)]
pub struct RecordBuilder {
    path: Vec<String>,
    text: String,
    attributes: Attributes,
    current: Option<RawRecord>,
}

impl RecordBuilder {
    /// Creates a new builder which isn't within any record.
    pub fn new() -> Self {
        RecordBuilder::default()
    }

    /// Handles the start of an element.
    ///
    /// This opens a new record for `oai:record`. In any case, the text collected so far is
    /// discarded and the attributes are kept until the element ends.
    pub fn start_element(&mut self, name: ExpandedName, attributes: Attributes) {
        if name.is(OAI, "record") {
            self.current = Some(RawRecord::default());
        }

        self.path.push(
            match name.namespace.as_deref().and_then(namespaces::prefix) {
                Some(prefix) => format!("{}:{}", prefix, name.local_name),
                None => name.local_name,
            },
        );
        self.text.clear();
        self.attributes = attributes;
    }

    /// Handles the end of an element.
    ///
    /// Returns the completed record if the element was `oai:record`.
    pub fn end_element(&mut self, name: &ExpandedName) -> Option<RawRecord> {
        let _ = self.path.pop();
        let record = self.current.as_mut()?;

        if name.is(OAI, "record") {
            return self.current.take();
        }

        let text = self.text.trim();
        if name.is(OAI, "identifier") {
            record.header.identifier = Some(text.to_owned());
            record
                .dc
                .identifier
                .push(TypedValue::new(text, Some(HEADER_IDENTIFIER_TYPE)));
        } else if name.is(OAI, "datestamp") {
            record.header.datestamp = Some(text.to_owned());
        } else if let Some(field) = fields::lookup(name.namespace.as_deref(), &name.local_name) {
            field.policy.apply(&mut record.dc, text, &self.attributes);
        }

        None
    }

    /// Collects character data of the current element.
    pub fn characters(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Returns the names of all open elements, separated by slashes.
    ///
    /// Names within a well-known namespace carry its conventional prefix.
    pub fn path(&self) -> String {
        self.path.join("/")
    }

    /// Determines if a record is currently being assembled.
    pub fn in_record(&self) -> bool {
        self.current.is_some()
    }
}

/// Adapts a [RecordBuilder] to the [ContentHandler] interface and forwards each completed record
/// to a sink.
pub struct RecordHandler<F: FnMut(RawRecord)> {
    builder: RecordBuilder,
    sink: F,
}

impl<F: FnMut(RawRecord)> RecordHandler<F> {
    /// Creates a new handler which feeds the given sink.
    pub fn new(sink: F) -> Self {
        RecordHandler {
            builder: RecordBuilder::new(),
            sink,
        }
    }
}

impl<F: FnMut(RawRecord)> ContentHandler for RecordHandler<F> {
    fn start_element(&mut self, name: ExpandedName, attributes: Attributes) {
        self.builder.start_element(name, attributes);
    }

    fn end_element(&mut self, name: ExpandedName) {
        if let Some(record) = self.builder.end_element(&name) {
            (self.sink)(record);
        }
    }

    fn characters(&mut self, text: &str) {
        self.builder.characters(text);
    }
}

/// Parses the given input and hands each completed record to the sink.
///
/// Records completed before a syntax error are still passed to the sink.
pub fn parse_records<B: BufRead, F: FnMut(RawRecord)>(input: B, sink: F) -> Result<(), XmlError> {
    let mut handler = RecordHandler::new(sink);
    parse(input, &mut handler)
}

/// Iterates over all records of an XML input.
///
/// The underlying reader is only advanced until the next record is complete. Once an error has
/// been reported, the iterator is exhausted.
pub struct RawRecords<B: BufRead> {
    reader: PullReader<B>,
    builder: RecordBuilder,
    failed: bool,
}

impl<B: BufRead> RawRecords<B> {
    /// Creates a new iterator for the given input.
    pub fn new(input: B) -> Self {
        RawRecords {
            reader: PullReader::new(input),
            builder: RecordBuilder::new(),
            failed: false,
        }
    }

    /// Returns the path of the element the reader is currently positioned in.
    pub fn path(&self) -> String {
        self.builder.path()
    }
}

impl<B: BufRead> Iterator for RawRecords<B> {
    type Item = Result<RawRecord, XmlError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            match self.reader.next_event() {
                Ok(Some(XmlEvent::Start(name, attributes))) => {
                    self.builder.start_element(name, attributes)
                }
                Ok(Some(XmlEvent::End(name))) => {
                    if let Some(record) = self.builder.end_element(&name) {
                        return Some(Ok(record));
                    }
                }
                Ok(Some(XmlEvent::Characters(text))) => self.builder.characters(&text),
                Ok(None) => return None,
                Err(error) => {
                    self.failed = true;
                    return Some(Err(error));
                }
            }
        }
    }
}
