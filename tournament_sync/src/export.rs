//! Export of a tournament collection to durable storage.

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::tournament::models::TournamentCollection;

/// Export error types. An export failure never affects in-memory state.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export destination: {0}")]
    Io(#[from] io::Error),

    #[error("failed to serialize collection: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Serialize the full ordered collection (nested events included) as
/// pretty-printed JSON at `path`.
///
/// Absent optional fields are omitted, so consumers can tell "no venue
/// address" from an empty one. The document lands via a temp sibling and a
/// rename, so concurrent readers never observe a truncated file.
pub fn export_collection(
    collection: &TournamentCollection,
    path: &Path,
) -> Result<(), ExportError> {
    let json = serde_json::to_vec_pretty(collection.records())?;
    write_atomic(path, &json)?;
    Ok(())
}

/// Write `bytes` to a `.tmp` sibling of `path` and rename it into place.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)
}
