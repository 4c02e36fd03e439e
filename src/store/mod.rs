//! Provides a normalized in-memory store for validated records.
//!
//! A [Catalog] keeps each record in a set of tables, similar to a relational schema: one row per
//! record with its scalar fields, shared creator rows (a creator is stored once no matter how
//! many records name it) and one row per identifier, publication place, issue date, subject and
//! resource link.
//!
//! Records are added through a [Session] which collects them in batches. A batch becomes
//! permanent with [Session::commit] or is discarded with [Session::rollback]. A catalog can be
//! stored as JSON snapshot via [Catalog::save] and read back via [Catalog::open].
//!
//! Searching is performed by [Catalog::search] which performs a case-insensitive substring
//! match on titles and creators and delivers the results page by page.
mod catalog;
mod search;
mod session;

pub use catalog::{Catalog, CreatorRow, LinkRow, RecordCreatorRow, RecordRow, TypedValueRow};
pub use search::{Page, SearchQuery, DEFAULT_PER_PAGE, MAX_PER_PAGE};
pub use session::Session;

#[cfg(test)]
mod tests {
    use crate::dcndl::loader::RecordLoader;
    use crate::dcndl::model::{Record, TypedValue};
    use crate::store::{Catalog, SearchQuery};
    use crate::testing::{record_xml, test_async, wrap_records, SCENARIO};

    fn records(data: &str) -> Vec<Record> {
        RecordLoader::default()
            .load(data.as_bytes(), "test")
            .unwrap()
            .records
    }

    fn populated() -> Catalog {
        let mut catalog = Catalog::new();
        {
            let mut session = catalog.session();
            for record in records(&wrap_records(&format!(
                "{}{}{}",
                record_xml("oai:x:1", "Rust in Action", &["Smith, J."]),
                record_xml("oai:x:2", "Programming Rust", &["Doe, A.", "Smith, J."]),
                record_xml("oai:x:3", "Sample Book", &["Roe, R."])
            ))) {
                let _ = session.create_record(&record).unwrap();
            }
            assert_eq!(session.commit(), 3);
        }

        catalog
    }

    #[test]
    fn records_are_read_back_unchanged() {
        let record = records(SCENARIO).remove(0);
        let mut catalog = Catalog::new();
        let mut session = catalog.session();
        let stored = session.create_record(&record).unwrap();
        let _ = session.commit();
        drop(session);

        assert_eq!(stored, record);
        assert_eq!(catalog.get(1), Some(record));
        assert_eq!(catalog.get(0), None);
        assert_eq!(catalog.get(2), None);
    }

    #[test]
    fn creators_are_shared_between_records() {
        let catalog = populated();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.creator_count(), 3);

        let page = catalog
            .search(&SearchQuery::default().with_creator("SMITH"))
            .unwrap();
        assert_eq!(page.total_items, 2);
        assert_eq!(page.items[0].header.identifier, "oai:x:1");
        assert_eq!(page.items[1].dc().creator, vec!["Doe, A.", "Smith, J."]);
    }

    #[test]
    fn duplicate_identifiers_are_rejected() {
        let mut record = records(SCENARIO).remove(0);
        record
            .metadata
            .dc
            .identifier
            .push(TypedValue::new("oai:example:1", Some("dcterms:URI")));

        let mut catalog = Catalog::new();
        let mut session = catalog.session();
        assert_eq!(session.create_record(&record).is_err(), true);
        assert_eq!(session.pending(), 0);
        let _ = session.commit();
        drop(session);
        assert_eq!(catalog.is_empty(), true);
        assert_eq!(catalog.creator_count(), 0);
    }

    #[test]
    fn rollback_discards_records_and_new_creators() {
        let mut catalog = populated();
        {
            let mut session = catalog.session();
            for record in records(&wrap_records(&record_xml(
                "oai:x:4",
                "Unsaved",
                &["Smith, J.", "New, N."],
            ))) {
                let _ = session.create_record(&record).unwrap();
            }
            assert_eq!(session.pending(), 1);
            assert_eq!(session.rollback(), 1);
            assert_eq!(session.pending(), 0);
        }
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.creator_count(), 3);

        {
            // Dropping a session without a commit also discards its records...
            let mut session = catalog.session();
            for record in records(&wrap_records(&record_xml("oai:x:5", "Lost", &["New, N."]))) {
                let _ = session.create_record(&record).unwrap();
            }
        }
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.creator_count(), 3);

        // ...so that the next record receives the next free id again.
        let mut session = catalog.session();
        for record in records(&wrap_records(&record_xml("oai:x:6", "Kept", &["New, N."]))) {
            let _ = session.create_record(&record).unwrap();
        }
        let _ = session.commit();
        drop(session);
        assert_eq!(catalog.get(4).unwrap().header.identifier, "oai:x:6");
        assert_eq!(catalog.creator_count(), 4);
    }

    #[test]
    fn search_filters_and_paginates() {
        let catalog = populated();

        let all = catalog.search(&SearchQuery::default()).unwrap();
        assert_eq!(all.total_items, 3);
        assert_eq!(all.total_pages, 1);

        let rust = catalog.search(&SearchQuery::default().with_q("rust")).unwrap();
        assert_eq!(rust.total_items, 2);

        // "q" also matches creators...
        let roe = catalog.search(&SearchQuery::default().with_q("roe")).unwrap();
        assert_eq!(roe.items[0].dc().title, "Sample Book");

        let both = catalog
            .search(&SearchQuery::default().with_q("rust").with_creator("doe"))
            .unwrap();
        assert_eq!(both.total_items, 1);
        assert_eq!(both.items[0].dc().title, "Programming Rust");

        let second = catalog
            .search(&SearchQuery::default().with_per_page(2).with_page(2))
            .unwrap();
        assert_eq!(second.total_items, 3);
        assert_eq!(second.total_pages, 2);
        assert_eq!(second.current_page, 2);
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].header.identifier, "oai:x:3");

        let beyond = catalog
            .search(&SearchQuery::default().with_per_page(2).with_page(5))
            .unwrap();
        assert_eq!(beyond.total_items, 3);
        assert_eq!(beyond.items.is_empty(), true);

        assert_eq!(
            catalog
                .search(&SearchQuery::default().with_per_page(101))
                .is_err(),
            true
        );
    }

    #[test]
    fn pages_far_beyond_the_last_one_are_empty() {
        let catalog = populated();
        let page = catalog
            .search(
                &SearchQuery::default()
                    .with_page(usize::MAX)
                    .with_per_page(100),
            )
            .unwrap();

        assert_eq!(page.total_items, 3);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.current_page, usize::MAX);
        assert_eq!(page.items.is_empty(), true);
    }

    #[test]
    fn header_identifier_is_stored_as_validated() {
        // The last OAI identifier wins for the header, but both end up in the identifier list...
        let record = records(&wrap_records(
            "<record><header>\
             <identifier>oai:a</identifier><identifier>oai:b</identifier>\
             <datestamp>2020-01-01</datestamp>\
             </header><metadata><dc><dc:title>T</dc:title></dc></metadata></record>",
        ))
        .remove(0);
        assert_eq!(record.header.identifier, "oai:b");
        assert_eq!(record.dc().identifier.len(), 2);

        let mut catalog = Catalog::new();
        let mut session = catalog.session();
        let stored = session.create_record(&record).unwrap();
        let _ = session.commit();
        drop(session);

        assert_eq!(stored.header.identifier, "oai:b");
        assert_eq!(stored, record);
        assert_eq!(catalog.get(1), Some(record));
    }

    #[test]
    fn snapshots_can_be_reopened() {
        test_async(async {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("catalog.json");

            let empty = Catalog::open(&path).await.unwrap();
            assert_eq!(empty.is_empty(), true);

            let catalog = populated();
            catalog.save(&path).await.unwrap();

            let mut reopened = Catalog::open(&path).await.unwrap();
            assert_eq!(reopened.len(), 3);
            assert_eq!(reopened.creator_count(), 3);

            let query = SearchQuery::default().with_creator("smith");
            let expected = catalog.search(&query).unwrap();
            let actual = reopened.search(&query).unwrap();
            assert_eq!(actual.items, expected.items);

            // The creator index is rebuilt so that known creators are re-used...
            let mut session = reopened.session();
            for record in records(&wrap_records(&record_xml("oai:x:9", "More", &["Roe, R."]))) {
                let _ = session.create_record(&record).unwrap();
            }
            let _ = session.commit();
            drop(session);
            assert_eq!(reopened.creator_count(), 3);
        });
    }
}
