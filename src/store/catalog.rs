//! Contains the normalized record tables and their JSON snapshots.
use crate::dcndl::model::{DcndlSimple, Header, Metadata, Record, ResourceLink, TypedValue};
use crate::store::search::{Page, SearchQuery};
use crate::store::session::Session;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Stores the header and the scalar fields of a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct RecordRow {
    pub id: usize,
    pub identifier: String,
    pub datestamp: DateTime<Utc>,
    pub title: String,
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
}

/// Stores a creator, which is shared by all records naming it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorRow {
    /// The id of the creator.
    pub id: usize,

    /// The exact name as found in the records.
    pub name: String,
}

/// Associates a record with one of its creators.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct RecordCreatorRow {
    /// The id of the record.
    pub record: usize,

    /// The id of the creator.
    pub creator: usize,
}

/// Stores a typed value (identifier, publication place, issue date or subject) of a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypedValueRow {
    /// The id of the record.
    pub record: usize,

    /// The value itself.
    pub value: String,

    /// The type of the value, if known.
    #[serde(rename = "type")]
    pub value_type: Option<String>,
}

/// Stores a resource link (see also, same as or thumbnail) of a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRow {
    /// The id of the record.
    pub record: usize,

    /// The URI of the linked resource.
    pub resource: String,
}

/// Trait for all rows which belong to a record.
pub(crate) trait ChildRow {
    fn record(&self) -> usize;
}

impl ChildRow for RecordCreatorRow {
    fn record(&self) -> usize {
        self.record
    }
}

impl ChildRow for TypedValueRow {
    fn record(&self) -> usize {
        self.record
    }
}

impl ChildRow for LinkRow {
    fn record(&self) -> usize {
        self.record
    }
}

/// Returns all rows belonging to the given record.
///
/// As records are only ever appended, all child tables are sorted by record id, which permits
/// to find the rows of a record using a binary search.
fn rows_of<R: ChildRow>(rows: &[R], record: usize) -> &[R] {
    let start = rows.partition_point(|row| row.record() < record);
    let end = start + rows[start..].partition_point(|row| row.record() == record);

    &rows[start..end]
}

fn typed_values(rows: &[TypedValueRow], record: usize) -> Vec<TypedValue> {
    rows_of(rows, record)
        .iter()
        .map(|row| TypedValue {
            value: row.value.clone(),
            value_type: row.value_type.clone(),
        })
        .collect()
}

fn links(rows: &[LinkRow], record: usize) -> Vec<ResourceLink> {
    rows_of(rows, record)
        .iter()
        .map(|row| ResourceLink::new(row.resource.as_str()))
        .collect()
}

/// Remembers the size of each table so that everything added later can be removed again.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub(crate) struct Checkpoint {
    records: usize,
    creators: usize,
    record_creators: usize,
    identifiers: usize,
    publication_places: usize,
    issued: usize,
    subjects: usize,
    see_alsos: usize,
    same_as_links: usize,
    thumbnails: usize,
}

impl Checkpoint {
    /// Returns the number of records contained when the checkpoint was taken.
    pub(crate) fn records(&self) -> usize {
        self.records
    }
}

/// Stores records in normalized tables.
///
/// Records are never modified once they have been stored. They are added via a [Session], which
/// permits to discard all records added since its last commit.
///
/// # Example
/// ```
/// # use opac::store::Catalog;
/// let catalog = Catalog::new();
/// assert_eq!(catalog.len(), 0);
/// assert_eq!(catalog.is_empty(), true);
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub(crate) records: Vec<RecordRow>,
    pub(crate) creators: Vec<CreatorRow>,
    pub(crate) record_creators: Vec<RecordCreatorRow>,
    pub(crate) identifiers: Vec<TypedValueRow>,
    pub(crate) publication_places: Vec<TypedValueRow>,
    pub(crate) issued: Vec<TypedValueRow>,
    pub(crate) subjects: Vec<TypedValueRow>,
    pub(crate) see_alsos: Vec<LinkRow>,
    pub(crate) same_as_links: Vec<LinkRow>,
    pub(crate) thumbnails: Vec<LinkRow>,

    #[serde(skip)]
    pub(crate) creator_index: HashMap<String, usize>,
}

impl Catalog {
    /// Creates a new and empty catalog.
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Reads the snapshot stored at the given path.
    ///
    /// If there is no such file, an empty catalog is returned.
    pub async fn open(path: &Path) -> anyhow::Result<Catalog> {
        if tokio::fs::metadata(path).await.is_err() {
            log::info!(
                "No catalog snapshot present at {}. Starting with an empty catalog.",
                path.display()
            );
            return Ok(Catalog::new());
        }

        let data = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read catalog snapshot {}", path.display()))?;
        let mut catalog: Catalog = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse catalog snapshot {}", path.display()))?;
        catalog.rebuild_creator_index();

        log::info!(
            "Loaded {} records and {} creators from {}.",
            catalog.len(),
            catalog.creator_count(),
            path.display()
        );

        Ok(catalog)
    }

    /// Writes a snapshot of all committed records to the given path.
    ///
    /// The data is first written into a temporary file next to the target, which is then
    /// renamed, so that a crash never leaves a partially written snapshot behind.
    pub async fn save(&self, path: &Path) -> anyhow::Result<()> {
        let data = serde_json::to_vec(self).context("Failed to serialize the catalog")?;

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let mut temp_name = OsString::from(path.as_os_str());
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        tokio::fs::write(&temp_path, data)
            .await
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        tokio::fs::rename(&temp_path, path)
            .await
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        log::info!("Stored {} records in {}.", self.len(), path.display());

        Ok(())
    }

    fn rebuild_creator_index(&mut self) {
        self.creator_index = self
            .creators
            .iter()
            .map(|creator| (creator.name.clone(), creator.id))
            .collect();
    }

    /// Opens a session which permits to add records.
    pub fn session(&mut self) -> Session<'_> {
        Session::new(self)
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Determines if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of distinct creators.
    pub fn creator_count(&self) -> usize {
        self.creators.len()
    }

    /// Reads the record with the given id.
    pub fn get(&self, id: usize) -> Option<Record> {
        self.record_row(id).map(|row| self.read_record(row))
    }

    /// Searches for records matching the given query.
    ///
    /// See [SearchQuery] for how the query is interpreted.
    pub fn search(&self, query: &SearchQuery) -> anyhow::Result<Page<Record>> {
        query.check()?;

        let mut total_items = 0;
        let mut items = Vec::new();
        let skip = (query.page - 1).saturating_mul(query.per_page);
        for row in &self.records {
            if !query.matches(&row.title, &self.creator_names(row.id)) {
                continue;
            }

            if total_items >= skip && items.len() < query.per_page {
                items.push(self.read_record(row));
            }
            total_items += 1;
        }

        log::debug!(
            "Search {:?} yielded {} items (page {}).",
            query,
            total_items,
            query.page
        );

        Ok(Page::new(items, total_items, query.page, query.per_page))
    }

    pub(crate) fn record_row(&self, id: usize) -> Option<&RecordRow> {
        id.checked_sub(1).and_then(|index| self.records.get(index))
    }

    fn creator_names(&self, record: usize) -> Vec<&str> {
        rows_of(&self.record_creators, record)
            .iter()
            .filter_map(|row| row.creator.checked_sub(1))
            .filter_map(|index| self.creators.get(index))
            .map(|creator| creator.name.as_str())
            .collect()
    }

    /// Reassembles a record from its rows.
    pub(crate) fn read_record(&self, row: &RecordRow) -> Record {
        Record {
            header: Header {
                identifier: row.identifier.clone(),
                datestamp: row.datestamp,
            },
            metadata: Metadata {
                dc: DcndlSimple {
                    title: row.title.clone(),
                    identifier: typed_values(&self.identifiers, row.id),
                    creator: self
                        .creator_names(row.id)
                        .into_iter()
                        .map(str::to_owned)
                        .collect(),
                    publisher: row.publisher.clone(),
                    alternative: row.alternative.clone(),
                    series_title: row.series_title.clone(),
                    date: row.date.clone(),
                    language: row.language.clone(),
                    extent: row.extent.clone(),
                    material_type: row.material_type.clone(),
                    access_rights: row.access_rights.clone(),
                    title_transcription: row.title_transcription.clone(),
                    volume: row.volume.clone(),
                    publication_place: typed_values(&self.publication_places, row.id),
                    issued: typed_values(&self.issued, row.id),
                    subject: typed_values(&self.subjects, row.id),
                    see_also: links(&self.see_alsos, row.id),
                    same_as: links(&self.same_as_links, row.id),
                    thumbnail: links(&self.thumbnails, row.id),
                },
            },
        }
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            records: self.records.len(),
            creators: self.creators.len(),
            record_creators: self.record_creators.len(),
            identifiers: self.identifiers.len(),
            publication_places: self.publication_places.len(),
            issued: self.issued.len(),
            subjects: self.subjects.len(),
            see_alsos: self.see_alsos.len(),
            same_as_links: self.same_as_links.len(),
            thumbnails: self.thumbnails.len(),
        }
    }

    /// Removes everything which has been added after the given checkpoint.
    pub(crate) fn restore(&mut self, checkpoint: &Checkpoint) {
        for creator in self.creators.iter().skip(checkpoint.creators) {
            let _ = self.creator_index.remove(&creator.name);
        }

        self.records.truncate(checkpoint.records);
        self.creators.truncate(checkpoint.creators);
        self.record_creators.truncate(checkpoint.record_creators);
        self.identifiers.truncate(checkpoint.identifiers);
        self.publication_places.truncate(checkpoint.publication_places);
        self.issued.truncate(checkpoint.issued);
        self.subjects.truncate(checkpoint.subjects);
        self.see_alsos.truncate(checkpoint.see_alsos);
        self.same_as_links.truncate(checkpoint.same_as_links);
        self.thumbnails.truncate(checkpoint.thumbnails);
    }
}
