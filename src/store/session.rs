//! Provides batched write access to a [Catalog].
use crate::dcndl::builder::HEADER_IDENTIFIER_TYPE;
use crate::dcndl::model::{Record, ResourceLink, TypedValue};
use crate::store::catalog::{
    Catalog, Checkpoint, CreatorRow, LinkRow, RecordCreatorRow, RecordRow, TypedValueRow,
};
use itertools::Itertools;
use std::collections::HashSet;

/// Adds records to a catalog.
///
/// All records created since the last [commit](Session::commit) are pending. They can be
/// discarded using [rollback](Session::rollback), which also removes all creators which were
/// only introduced by them. Dropping a session rolls back all pending records.
///
/// # Example
/// ```
/// # use opac::store::Catalog;
/// let mut catalog = Catalog::new();
/// {
///     let mut session = catalog.session();
///     assert_eq!(session.pending(), 0);
///     assert_eq!(session.rollback(), 0);
/// }
/// assert_eq!(catalog.len(), 0);
/// ```
pub struct Session<'a> {
    catalog: &'a mut Catalog,
    checkpoint: Checkpoint,
}

impl<'a> Session<'a> {
    pub(crate) fn new(catalog: &'a mut Catalog) -> Self {
        let checkpoint = catalog.checkpoint();
        Session {
            catalog,
            checkpoint,
        }
    }

    /// Stores the given record and returns it as read back from the catalog.
    ///
    /// Creators are looked up by their exact name and only created if not yet known. A creator
    /// named several times by the same record is only associated once. Fails if the record
    /// contains the same identifier (value and type) twice or lacks an identifier of type
    /// `dcterms:URI`. In this case nothing is stored at all.
    pub fn create_record(&mut self, record: &Record) -> anyhow::Result<Record> {
        let dc = record.dc();

        let mut seen = HashSet::new();
        for identifier in &dc.identifier {
            if !seen.insert((identifier.value.as_str(), identifier.value_type.as_deref())) {
                return Err(anyhow::anyhow!(
                    "Duplicate identifier '{}' ({}) in record {}",
                    identifier.value,
                    identifier.value_type.as_deref().unwrap_or("untyped"),
                    record.header.identifier
                ));
            }
        }
        if !dc
            .identifier
            .iter()
            .any(|identifier| identifier.is_of_type(HEADER_IDENTIFIER_TYPE))
        {
            return Err(anyhow::anyhow!(
                "Record {} has no identifier of type {}",
                record.header.identifier,
                HEADER_IDENTIFIER_TYPE
            ));
        }

        let catalog = &mut *self.catalog;
        let id = catalog.records.len() + 1;
        catalog.records.push(RecordRow {
            id,
            identifier: record.header.identifier.clone(),
            datestamp: record.header.datestamp,
            title: dc.title.clone(),
            publisher: dc.publisher.clone(),
            alternative: dc.alternative.clone(),
            series_title: dc.series_title.clone(),
            date: dc.date.clone(),
            language: dc.language.clone(),
            extent: dc.extent.clone(),
            material_type: dc.material_type.clone(),
            access_rights: dc.access_rights.clone(),
            title_transcription: dc.title_transcription.clone(),
            volume: dc.volume.clone(),
        });

        for name in dc.creator.iter().unique() {
            let creator = Session::find_or_create_creator(catalog, name);
            catalog.record_creators.push(RecordCreatorRow {
                record: id,
                creator,
            });
        }

        push_typed_values(&mut catalog.identifiers, id, &dc.identifier);
        push_typed_values(&mut catalog.publication_places, id, &dc.publication_place);
        push_typed_values(&mut catalog.issued, id, &dc.issued);
        push_typed_values(&mut catalog.subjects, id, &dc.subject);
        push_links(&mut catalog.see_alsos, id, &dc.see_also);
        push_links(&mut catalog.same_as_links, id, &dc.same_as);
        push_links(&mut catalog.thumbnails, id, &dc.thumbnail);

        let row = catalog
            .record_row(id)
            .ok_or_else(|| anyhow::anyhow!("Record {} vanished while being stored", id))?;
        Ok(catalog.read_record(row))
    }

    fn find_or_create_creator(catalog: &mut Catalog, name: &str) -> usize {
        if let Some(id) = catalog.creator_index.get(name) {
            return *id;
        }

        let id = catalog.creators.len() + 1;
        catalog.creators.push(CreatorRow {
            id,
            name: name.to_owned(),
        });
        let _ = catalog.creator_index.insert(name.to_owned(), id);

        id
    }

    /// Returns the number of records created since the last commit or rollback.
    pub fn pending(&self) -> usize {
        self.catalog.len() - self.checkpoint.records()
    }

    /// Makes all pending records permanent.
    ///
    /// Returns the number of records committed.
    pub fn commit(&mut self) -> usize {
        let committed = self.pending();
        self.checkpoint = self.catalog.checkpoint();

        committed
    }

    /// Discards all pending records.
    ///
    /// Returns the number of records discarded.
    pub fn rollback(&mut self) -> usize {
        let discarded = self.pending();
        self.catalog.restore(&self.checkpoint);

        discarded
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        let discarded = self.rollback();
        if discarded > 0 {
            log::debug!(
                "Discarded {} uncommitted records as the session was dropped.",
                discarded
            );
        }
    }
}

fn push_typed_values(rows: &mut Vec<TypedValueRow>, record: usize, values: &[TypedValue]) {
    rows.extend(values.iter().map(|value| TypedValueRow {
        record,
        value: value.value.clone(),
        value_type: value.value_type.clone(),
    }));
}

fn push_links(rows: &mut Vec<LinkRow>, record: usize, links: &[ResourceLink]) {
    rows.extend(links.iter().map(|link| LinkRow {
        record,
        resource: link.resource.clone(),
    }));
}
