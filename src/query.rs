//! The two read operations: exact-timestamp last position and
//! closest-satellite-at-time.

use chrono::NaiveDateTime;
use ordered_float::OrderedFloat;

use crate::error::{Result, SatError};
use crate::geo;
use crate::model::Mark;
use crate::SatDb;

/// Second-precision timestamp, no timezone. The source feed's granularity.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Reject anything that does not parse strictly as `YYYY-MM-DDTHH:MM:SS`.
/// Runs before any store access.
pub fn validate_timestamp(t: &str) -> Result<()> {
    NaiveDateTime::parse_from_str(t, TIMESTAMP_FORMAT)
        .map(|_| ())
        .map_err(|_| SatError::InvalidTimestamp)
}

fn parse_coordinate(value: &str) -> Result<f64> {
    value.parse::<f64>().map_err(|_| SatError::InvalidCoordinate {
        value: value.to_string(),
    })
}

/// Last known position of `id` at timestamp `t`.
///
/// The match is an exact equality filter on `(id, creation_date)`, not an
/// at-or-before search; `t` pins the record precisely. Duplicate inserts of
/// the same pair are resolved in favor of the latest insertion.
pub async fn last_position(db: &SatDb, id: &str, t: &str) -> Result<Mark> {
    validate_timestamp(t)?;
    db.mark_at(id, t).await?.ok_or(SatError::NoMatch)
}

/// Closest mark to `(latitude, longitude)` among those recorded exactly at
/// `t`, plus its haversine distance in kilometers.
///
/// Coordinates arrive as raw path strings and are validated here, so a
/// malformed number surfaces as `InvalidCoordinate` rather than a panic.
pub async fn closest_satellite(
    db: &SatDb,
    t: &str,
    latitude: &str,
    longitude: &str,
) -> Result<(Mark, f64)> {
    validate_timestamp(t)?;
    let lat = parse_coordinate(latitude)?;
    let lon = parse_coordinate(longitude)?;

    let candidates = db.marks_at(t).await?;

    let mut best: Option<(Mark, f64)> = None;
    for mark in candidates {
        let d = geo::haversine((lat, lon), (mark.latitude, mark.longitude));
        // Strict less-than keeps the first-encountered mark on ties.
        let better = match &best {
            Some((_, current)) => OrderedFloat(d) < OrderedFloat(*current),
            None => true,
        };
        if better {
            best = Some((mark, d));
        }
    }

    best.ok_or(SatError::NoMatch)
}
