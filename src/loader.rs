//! Destructive re-seed of the store from the historical dataset.

use std::fs;
use std::path::Path;

use crate::error::{Result, SatError};
use crate::model::{NewMark, SourceRecord};
use crate::SatDb;

/// Drop whatever the store holds and load the dataset at `path`.
/// Returns the number of records present afterwards.
pub async fn reload(db: &SatDb, path: &Path) -> Result<u64> {
    let records = read_dataset(path)?;
    let marks: Vec<NewMark> = records.into_iter().map(NewMark::from).collect();

    tracing::info!(records = marks.len(), "reloading marks table");
    db.replace_all(&marks).await
}

/// Read and deserialize the source feed: a JSON array of records carrying
/// `id`, coordinates, and the nested `spaceTrack.CREATION_DATE`.
fn read_dataset(path: &Path) -> Result<Vec<SourceRecord>> {
    if !path.exists() {
        return Err(SatError::DatasetNotFound {
            path: path.to_path_buf(),
        });
    }

    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|e| SatError::DatasetMalformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
