//! Populates a [Catalog] from all XML files within a directory.
//!
//! Files are processed one after another in lexical order. Each file is parsed on tokio's
//! blocking pool and its records are then stored through a single [Session](crate::store::Session)
//! which is committed every `batch_size` records and once a file has been completely stored.
//!
//! A file which cannot be loaded (e.g. as it contains malformed XML) or whose records cannot be
//! stored is logged and its uncommitted records are rolled back. Processing then continues with
//! the next file.
use crate::config::LoaderSettings;
use crate::dcndl::loader::{LoadReport, RecordLoader};
use crate::store::{Catalog, Session};
use anyhow::Context;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Summarizes a population run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PopulateReport {
    /// The number of XML files found.
    pub files: usize,

    /// The number of files which failed and were rolled back.
    pub failed_files: usize,

    /// The number of records which have been committed.
    pub saved: usize,

    /// The number of records which failed validation.
    pub skipped: usize,
}

/// Lists all `*.xml` files in the given directory, sorted by name.
///
/// Fails if the directory cannot be read or contains no XML files at all.
pub async fn find_xml_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Cannot read data directory {}", dir.display()))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("Cannot list data directory {}", dir.display()))?
    {
        let path = entry.path();
        let is_xml = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(|extension| extension.eq_ignore_ascii_case("xml"))
            .unwrap_or(false);
        if is_xml && path.is_file() {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(anyhow::anyhow!(
            "No XML files found in {}. Aborting.",
            dir.display()
        ));
    }

    files.sort();
    Ok(files)
}

/// Loads all XML files of the given directory into the catalog.
pub async fn populate(
    catalog: &mut Catalog,
    data_dir: &Path,
    settings: &LoaderSettings,
) -> anyhow::Result<PopulateReport> {
    let files = find_xml_files(data_dir).await?;
    log::info!(
        "Found {} XML file(s) in {}.",
        files.len(),
        data_dir.display()
    );

    let loader = RecordLoader::new(settings.max_logged_rejections);
    let batch_size = settings.batch_size.max(1);
    let mut report = PopulateReport {
        files: files.len(),
        ..PopulateReport::default()
    };

    let mut session = catalog.session();
    for file in files {
        log::info!("Processing file: {}", file.display());

        let result = load(loader, file.clone())
            .await
            .and_then(|loaded| store(&mut session, &loaded, batch_size, &mut report));
        match result {
            Ok(stored) => {
                report.saved += session.commit();
                log::info!("Stored {} records from {}.", stored, file.display());
            }
            Err(error) => {
                let discarded = session.rollback();
                report.failed_files += 1;
                log::error!(
                    "Failed to process file {} (discarded {} uncommitted records): {:#}",
                    file.display(),
                    discarded,
                    error
                );
            }
        }
    }

    log::info!(
        "Finished saving. Total records saved from all files: {}.",
        report.saved
    );

    Ok(report)
}

/// Parses a file on the blocking pool, as this is CPU bound work.
async fn load(loader: RecordLoader, file: PathBuf) -> anyhow::Result<LoadReport> {
    tokio::task::spawn_blocking(move || loader.load_file(&file))
        .await
        .context("The XML loader task crashed")?
}

/// Stores the records of a file, committing every `batch_size` records.
fn store(
    session: &mut Session,
    loaded: &LoadReport,
    batch_size: usize,
    report: &mut PopulateReport,
) -> anyhow::Result<usize> {
    report.skipped += loaded.skipped;

    for record in &loaded.records {
        let _ = session.create_record(record)?;
        if session.pending() >= batch_size {
            report.saved += session.commit();
            log::info!(
                "Committed batch. Total records saved so far: {}",
                report.saved
            );
        }
    }

    Ok(loaded.records.len())
}
