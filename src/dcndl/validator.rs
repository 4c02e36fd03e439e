//! Turns [RawRecord]s into validated [Record]s.
//!
//! Validation has no side effects. The checks are performed in a fixed order and the first
//! failing one is reported:
//!
//! 1. the header identifier must be present and non-empty,
//! 2. the header datestamp must be present and non-empty,
//! 3. the datestamp must be parseable (see [parse_datestamp]),
//! 4. a title must be present,
//! 5. at least one identifier must be present.
use crate::dcndl::model::{DcndlSimple, Header, Metadata, Record};
use crate::dcndl::raw::RawRecord;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::borrow::Cow;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Describes why a record was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The header identifier is missing or empty.
    MissingHeaderIdentifier,

    /// The header datestamp is missing or empty.
    MissingDatestamp,

    /// The header datestamp (given here) couldn't be parsed.
    InvalidDatestamp(String),

    /// The record has no title.
    MissingTitle,

    /// The record has no identifier at all.
    MissingIdentifier,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingHeaderIdentifier => write!(f, "Missing header identifier"),
            ValidationError::MissingDatestamp => write!(f, "Missing header datestamp"),
            ValidationError::InvalidDatestamp(value) => {
                write!(f, "Invalid header datestamp: '{}'", value)
            }
            ValidationError::MissingTitle => write!(f, "Missing title (dc:title)"),
            ValidationError::MissingIdentifier => write!(f, "Missing identifier (dc:identifier)"),
        }
    }
}

impl Error for ValidationError {}

/// Lists the accepted date-time layouts without offset.
const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Lists the accepted date-time layouts with a numeric offset.
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M%#z"];

/// Parses a datestamp as used in OAI headers.
///
/// Accepts RFC 3339 timestamps as well as ISO 8601 date-times with or without seconds, using
/// either `T` or a space as separator. Date-times without offset are taken as UTC and plain
/// dates mean midnight UTC.
///
/// # Example
/// ```
/// # use opac::dcndl::validator::parse_datestamp;
/// let utc = parse_datestamp("2020-01-01T00:00:00Z").unwrap();
/// assert_eq!(parse_datestamp("2020-01-01T09:00:00+09:00").unwrap(), utc);
/// assert_eq!(parse_datestamp("2020-01-01T00:00:00").unwrap(), utc);
/// assert_eq!(parse_datestamp("2020-01-01 00:00").unwrap(), utc);
/// assert_eq!(parse_datestamp("2020-01-01").unwrap(), utc);
/// assert_eq!(parse_datestamp("yesterday").is_none(), true);
/// ```
pub fn parse_datestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = normalize_separator(value);
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(&value) {
        return Some(timestamp.with_timezone(&Utc));
    }

    let (local, zulu) = match value.strip_suffix(|c: char| c == 'Z' || c == 'z') {
        Some(local) => (local, true),
        None => (&*value, false),
    };

    for format in LOCAL_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(local, format) {
            return Some(Utc.from_utc_datetime(&timestamp));
        }
    }

    if !zulu {
        for format in OFFSET_FORMATS {
            if let Ok(timestamp) = DateTime::parse_from_str(local, format) {
                return Some(timestamp.with_timezone(&Utc));
            }
        }
    }

    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|timestamp| Utc.from_utc_datetime(&timestamp))
}

/// Replaces a space (or lowercase `t`) between date and time by `T`.
fn normalize_separator(value: &str) -> Cow<'_, str> {
    match value.as_bytes().get(10) {
        Some(b' ') | Some(b't') => Cow::Owned(format!("{}T{}", &value[..10], &value[11..])),
        _ => Cow::Borrowed(value),
    }
}

/// Validates the given record.
pub fn validate(raw: RawRecord) -> Result<Record, ValidationError> {
    let identifier = raw
        .header
        .identifier
        .filter(|identifier| !identifier.trim().is_empty())
        .ok_or(ValidationError::MissingHeaderIdentifier)?;

    let datestamp = raw
        .header
        .datestamp
        .filter(|datestamp| !datestamp.trim().is_empty())
        .ok_or(ValidationError::MissingDatestamp)?;
    let datestamp = parse_datestamp(datestamp.trim())
        .ok_or_else(|| ValidationError::InvalidDatestamp(datestamp.clone()))?;

    let dc = raw.dc;
    let title = dc.title.ok_or(ValidationError::MissingTitle)?;
    if dc.identifier.is_empty() {
        return Err(ValidationError::MissingIdentifier);
    }

    Ok(Record {
        header: Header {
            identifier,
            datestamp,
        },
        metadata: Metadata {
            dc: DcndlSimple {
                title,
                identifier: dc.identifier,
                creator: dc.creator,
                publisher: dc.publisher,
                alternative: dc.alternative,
                series_title: dc.series_title,
                date: dc.date,
                language: dc.language,
                extent: dc.extent,
                material_type: dc.material_type,
                access_rights: dc.access_rights,
                title_transcription: dc.title_transcription,
                volume: dc.volume,
                publication_place: dc.publication_place,
                issued: dc.issued,
                subject: dc.subject,
                see_also: dc.see_also,
                same_as: dc.same_as,
                thumbnail: dc.thumbnail,
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use crate::dcndl::model::TypedValue;
    use crate::dcndl::raw::RawRecord;
    use crate::dcndl::validator::{parse_datestamp, validate, ValidationError};
    use chrono::{TimeZone, Utc};

    fn complete() -> RawRecord {
        let mut raw = RawRecord::default();
        raw.header.identifier = Some("oai:x:1".to_owned());
        raw.header.datestamp = Some("2020-01-01T00:00:00Z".to_owned());
        raw.dc.title = Some("Title".to_owned());
        raw.dc
            .identifier
            .push(TypedValue::new("oai:x:1", Some("dcterms:URI")));
        raw
    }

    #[test]
    fn complete_records_are_accepted() {
        let record = validate(complete()).unwrap();
        assert_eq!(record.header.identifier, "oai:x:1");
        assert_eq!(
            record.header.datestamp,
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(record.dc().title, "Title");
    }

    #[test]
    fn checks_are_performed_in_order() {
        // Nothing present at all, therefore the header identifier is reported first...
        assert_eq!(
            validate(RawRecord::default()),
            Err(ValidationError::MissingHeaderIdentifier)
        );

        let mut raw = complete();
        raw.header.identifier = Some("  ".to_owned());
        assert_eq!(validate(raw), Err(ValidationError::MissingHeaderIdentifier));

        let mut raw = complete();
        raw.header.datestamp = None;
        raw.dc.title = None;
        assert_eq!(validate(raw), Err(ValidationError::MissingDatestamp));

        let mut raw = complete();
        raw.header.datestamp = Some("01.01.2020".to_owned());
        raw.dc.title = None;
        assert_eq!(
            validate(raw),
            Err(ValidationError::InvalidDatestamp("01.01.2020".to_owned()))
        );

        let mut raw = complete();
        raw.dc.title = None;
        raw.dc.identifier.clear();
        assert_eq!(validate(raw), Err(ValidationError::MissingTitle));

        let mut raw = complete();
        raw.dc.identifier.clear();
        assert_eq!(validate(raw), Err(ValidationError::MissingIdentifier));
    }

    #[test]
    fn empty_titles_are_accepted() {
        let mut raw = complete();
        raw.dc.title = Some(String::new());
        assert_eq!(validate(raw).unwrap().dc().title, "");
    }

    #[test]
    fn iso_variants_are_accepted() {
        let utc = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        for value in [
            "2020-01-01 00:00:00",
            "2020-01-01 00:00:00Z",
            "2020-01-01t00:00:00",
            "2020-01-01T00:00",
            "2020-01-01T00:00Z",
            "2020-01-01 00:00",
            "2020-01-01T09:00+09:00",
            "2020-01-01 09:00:00+0900",
            "2019-12-31T19:00:00.000-05:00",
        ] {
            assert_eq!(parse_datestamp(value), Some(utc), "{}", value);
        }

        let with_fraction = parse_datestamp("2020-01-01 12:30:00.250").unwrap();
        assert_eq!(with_fraction.timestamp_subsec_millis(), 250);

        let mut raw = complete();
        raw.header.datestamp = Some("2020-01-01 00:00".to_owned());
        assert_eq!(validate(raw).unwrap().header.datestamp, utc);
    }

    #[test]
    fn fractional_seconds_are_supported() {
        let timestamp = parse_datestamp("2020-01-01T12:30:00.250").unwrap();
        assert_eq!(timestamp.timestamp_subsec_millis(), 250);
        assert_eq!(parse_datestamp("2020-13-01").is_none(), true);
    }
}
