//! Permits to read namespace aware XML data as a stream of events.
//!
//! Using this facility permits to process large XML files without ever materializing the whole
//! document. The underlying **quick_xml** reader resolves all namespace prefixes, so that each
//! element and attribute is reported by its expanded name (namespace URI plus local name)
//! instead of its prefixed name. Records harvested from different sources happily use different
//! prefixes for the same vocabulary, therefore all matching has to happen on expanded names.
//!
//! Events can either be pulled one by one using a [PullReader] or pushed into a
//! [ContentHandler] using [parse]:
//!
//! ```
//! use opac::xml::{PullReader, XmlEvent};
//!
//! let data = r#"
//! <list xmlns:x="http://example.com/x">
//!     <x:entry x:kind="test">42</x:entry>
//! </list>
//! "#;
//!
//! let mut reader = PullReader::new(data.as_bytes());
//! let mut found = false;
//! while let Some(event) = reader.next_event().unwrap() {
//!     if let XmlEvent::Start(name, attributes) = event {
//!         if name.is("http://example.com/x", "entry") {
//!             assert_eq!(attributes.get("http://example.com/x", "kind"), Some("test"));
//!             found = true;
//!         }
//!     }
//! }
//! assert_eq!(found, true);
//! ```
//!
//! # Errors
//!
//! Any syntax error, mismatched end tag, undeclared prefix or invalid UTF-8 aborts reading with
//! an [XmlError]. Also reaching the end of the input while elements are still open is reported
//! as error, so that a consumer never mistakes a truncated document for a complete one.
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::BufRead;
use std::str::Utf8Error;

/// Represents the name of an element or attribute after namespace resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandedName {
    /// Contains the namespace URI or `None` if the name isn't bound to any namespace.
    pub namespace: Option<String>,

    /// Contains the local part of the name (without any prefix).
    pub local_name: String,
}

impl ExpandedName {
    /// Creates a new name for the given namespace and local name.
    pub fn new(namespace: Option<String>, local_name: impl Into<String>) -> Self {
        ExpandedName {
            namespace,
            local_name: local_name.into(),
        }
    }

    /// Determines if this name is the given local name within the given namespace.
    ///
    /// # Example
    /// ```
    /// # use opac::xml::ExpandedName;
    /// let name = ExpandedName::new(Some("urn:test".to_owned()), "item");
    /// assert_eq!(name.is("urn:test", "item"), true);
    /// assert_eq!(name.is("urn:other", "item"), false);
    /// ```
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.local_name == local_name && self.namespace.as_deref() == Some(namespace)
    }
}

impl Display for ExpandedName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{{{}}}{}", namespace, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

/// Contains the attributes of an element by their expanded names.
///
/// Note that namespace declarations (`xmlns` and `xmlns:prefix`) are consumed by the reader and
/// are therefore never reported as attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(ExpandedName, String)>,
}

impl Attributes {
    /// Adds an attribute.
    pub fn push(&mut self, name: ExpandedName, value: impl Into<String>) {
        self.entries.push((name, value.into()));
    }

    /// Returns the value of the attribute with the given namespace and local name.
    pub fn get(&self, namespace: &str, local_name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name.is(namespace, local_name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the value of an attribute which isn't bound to any namespace.
    pub fn get_unqualified(&self, local_name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name.namespace.is_none() && name.local_name == local_name)
            .map(|(_, value)| value.as_str())
    }
}

/// Represents a single event within the XML stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// An element was opened. Self-closing elements are reported as `Start` immediately
    /// followed by `End`.
    Start(ExpandedName, Attributes),

    /// An element was closed.
    End(ExpandedName),

    /// Character data (either text or CDATA) with all entities being resolved.
    Characters(String),
}

/// Describes the errors which abort reading an XML stream.
#[derive(Debug)]
pub enum XmlError {
    /// The underlying reader detected a syntax error, a mismatched end tag or failed to read
    /// from its input.
    Syntax(quick_xml::Error),

    /// The input contained data which isn't valid UTF-8.
    Encoding(Utf8Error),

    /// An element or attribute used a prefix which was never declared.
    UnboundPrefix(String),

    /// The input ended while the given number of elements were still open.
    UnexpectedEof(usize),
}

impl Display for XmlError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            XmlError::Syntax(e) => write!(f, "Malformed XML: {}", e),
            XmlError::Encoding(e) => write!(f, "Invalid UTF-8 in XML data: {}", e),
            XmlError::UnboundPrefix(prefix) => write!(f, "Unbound namespace prefix: {}", prefix),
            XmlError::UnexpectedEof(open) => write!(
                f,
                "Unexpected end of XML data with {} element(s) still open",
                open
            ),
        }
    }
}

impl Error for XmlError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            XmlError::Syntax(ref e) => Some(e),
            XmlError::Encoding(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for XmlError {
    fn from(err: quick_xml::Error) -> XmlError {
        match err {
            quick_xml::Error::NonDecodable(Some(utf8_error)) => XmlError::Encoding(utf8_error),
            other => XmlError::Syntax(other),
        }
    }
}

impl From<Utf8Error> for XmlError {
    fn from(err: Utf8Error) -> XmlError {
        XmlError::Encoding(err)
    }
}

/// Provides the callbacks invoked by [parse] for each event in document order.
pub trait ContentHandler {
    /// Invoked once an element is opened.
    fn start_element(&mut self, name: ExpandedName, attributes: Attributes);

    /// Invoked once an element is closed.
    fn end_element(&mut self, name: ExpandedName);

    /// Invoked for each chunk of character data. Note that the text of a single element
    /// might be split up into several chunks.
    fn characters(&mut self, text: &str);
}

/// Provides a high level abstraction above `NsReader` as provided by `quick_xml`.
///
/// This takes care of buffer management, namespace resolution and decoding and yields owned
/// events so that consumers can keep state across events without fighting the borrow checker.
pub struct PullReader<B: BufRead> {
    reader: NsReader<B>,
    buffer: Vec<u8>,
    pending_end: Option<ExpandedName>,
    depth: usize,
}

impl<B: BufRead> PullReader<B> {
    /// Creates a new reader for the given input.
    pub fn new(input: B) -> Self {
        PullReader {
            reader: NsReader::from_reader(input),
            buffer: Vec::with_capacity(4096),
            pending_end: None,
            depth: 0,
        }
    }

    /// Reads the next event.
    ///
    /// Returns `None` once the end of the input has been reached. Comments, processing
    /// instructions and the XML declaration are skipped.
    ///
    /// # Example
    /// ```
    /// # use opac::xml::{PullReader, XmlEvent};
    /// let mut reader = PullReader::new("<a>text</a>".as_bytes());
    /// assert!(matches!(reader.next_event().unwrap(), Some(XmlEvent::Start(_, _))));
    /// assert_eq!(reader.next_event().unwrap(), Some(XmlEvent::Characters("text".to_owned())));
    /// assert!(matches!(reader.next_event().unwrap(), Some(XmlEvent::End(_))));
    /// assert_eq!(reader.next_event().unwrap(), None);
    /// ```
    pub fn next_event(&mut self) -> Result<Option<XmlEvent>, XmlError> {
        if let Some(name) = self.pending_end.take() {
            return Ok(Some(XmlEvent::End(name)));
        }

        loop {
            self.buffer.clear();
            let (resolved, event) = self.reader.read_resolved_event_into(&mut self.buffer)?;
            match event {
                Event::Start(start) => {
                    let name = expanded_name(resolved, start.local_name().as_ref())?;
                    let attributes = resolve_attributes(&self.reader, &start)?;
                    self.depth += 1;
                    return Ok(Some(XmlEvent::Start(name, attributes)));
                }
                Event::Empty(start) => {
                    let name = expanded_name(resolved, start.local_name().as_ref())?;
                    let attributes = resolve_attributes(&self.reader, &start)?;
                    self.pending_end = Some(name.clone());
                    return Ok(Some(XmlEvent::Start(name, attributes)));
                }
                Event::End(end) => {
                    let name = expanded_name(resolved, end.local_name().as_ref())?;
                    self.depth = self.depth.saturating_sub(1);
                    return Ok(Some(XmlEvent::End(name)));
                }
                Event::Text(text) => {
                    return Ok(Some(XmlEvent::Characters(text.unescape()?.into_owned())));
                }
                Event::CData(data) => {
                    return Ok(Some(XmlEvent::Characters(
                        std::str::from_utf8(&data)?.to_owned(),
                    )));
                }
                Event::Eof => {
                    return if self.depth > 0 {
                        Err(XmlError::UnexpectedEof(self.depth))
                    } else {
                        Ok(None)
                    };
                }
                _ => {}
            }
        }
    }
}

/// Transforms the result of the namespace resolution into an owned name.
fn expanded_name(resolved: ResolveResult, local_name: &[u8]) -> Result<ExpandedName, XmlError> {
    let namespace = match resolved {
        ResolveResult::Bound(Namespace(uri)) => Some(std::str::from_utf8(uri)?.to_owned()),
        ResolveResult::Unbound => None,
        ResolveResult::Unknown(prefix) => {
            return Err(XmlError::UnboundPrefix(
                String::from_utf8_lossy(&prefix).into_owned(),
            ))
        }
    };

    Ok(ExpandedName::new(
        namespace,
        std::str::from_utf8(local_name)?.to_owned(),
    ))
}

/// Resolves and decodes all attributes of the given element while skipping namespace
/// declarations.
fn resolve_attributes<B>(
    reader: &NsReader<B>,
    start: &BytesStart,
) -> Result<Attributes, XmlError> {
    let mut attributes = Attributes::default();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        let key = attribute.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }

        let (resolved, local_name) = reader.resolve_attribute(attribute.key);
        let name = expanded_name(resolved, local_name.as_ref())?;
        attributes.push(name, attribute.unescape_value()?.into_owned());
    }

    Ok(attributes)
}

/// Reads the whole input and pushes each event into the given handler.
///
/// Note that the handler might already have received events when an error is reported, as
/// processing happens strictly in document order.
pub fn parse<B: BufRead, H: ContentHandler>(input: B, handler: &mut H) -> Result<(), XmlError> {
    let mut reader = PullReader::new(input);
    while let Some(event) = reader.next_event()? {
        match event {
            XmlEvent::Start(name, attributes) => handler.start_element(name, attributes),
            XmlEvent::End(name) => handler.end_element(name),
            XmlEvent::Characters(text) => handler.characters(text.as_str()),
        }
    }

    Ok(())
}
