use serde::{Deserialize, Serialize};
use std::fmt;

/// One stored position observation of one satellite.
///
/// `creation_date` is kept verbatim as the second-precision source string
/// (`YYYY-MM-DDTHH:MM:SS`); all matching against it is string equality.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Mark {
    /// Surrogate key assigned by the store; used only to break ties between
    /// duplicate (id, creation_date) inserts.
    pub pk: i64,
    pub id: String,
    pub longitude: f64,
    pub latitude: f64,
    pub creation_date: String,
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sat: {}, longitude: {}, latitude: {} creation_date: {}",
            self.id, self.longitude, self.latitude, self.creation_date
        )
    }
}

/// A mark ready for insertion; the store assigns `pk`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMark {
    pub id: String,
    pub longitude: f64,
    pub latitude: f64,
    pub creation_date: String,
}

/// One record of the historical source feed.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceRecord {
    pub id: String,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(rename = "spaceTrack")]
    pub space_track: SpaceTrack,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpaceTrack {
    #[serde(rename = "CREATION_DATE")]
    pub creation_date: String,
}

impl From<SourceRecord> for NewMark {
    fn from(record: SourceRecord) -> Self {
        Self {
            id: record.id,
            // The feed leaves coordinates null for decayed satellites.
            longitude: record.longitude.unwrap_or(0.0),
            latitude: record.latitude.unwrap_or(0.0),
            creation_date: record.space_track.creation_date,
        }
    }
}
