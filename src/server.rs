//! HTTP boundary: routes, parameter extraction, and error mapping.

use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use warp::http::StatusCode;
use warp::reply::{self, Reply, Response};
use warp::Filter;

use crate::error::SatError;
use crate::{loader, query, SatDb};

/// Body of a successful closest-satellite response.
#[derive(Debug, Serialize)]
struct ClosestReply {
    sat: String,
    distance: f64,
}

/// All routes, with the store handle and dataset path injected per request.
pub fn routes(
    db: SatDb,
    dataset: PathBuf,
) -> impl Filter<Extract = (Response,), Error = warp::Rejection> + Clone {
    let dataset = Arc::new(dataset);

    // GET /setup
    let setup = warp::get()
        .and(warp::path("setup"))
        .and(warp::path::end())
        .and(with_db(db.clone()))
        .and(with_dataset(dataset))
        .and_then(handle_setup);

    // GET /sat/lastposition/{id}/{t}/
    let last_position = warp::get()
        .and(warp::path!("sat" / "lastposition" / String / String))
        .and(with_db(db.clone()))
        .and_then(handle_last_position);

    // GET /sat/closestfrom/{t}/{lat}/{lon}
    let closest = warp::get()
        .and(warp::path!("sat" / "closestfrom" / String / String / String))
        .and(with_db(db))
        .and_then(handle_closest);

    setup.or(last_position).unify().or(closest).unify()
}

async fn handle_setup(db: SatDb, dataset: Arc<PathBuf>) -> Result<Response, Infallible> {
    match loader::reload(&db, &dataset).await {
        Ok(count) => {
            tracing::info!(count, "store reinitialized");
            let msg = format!("Database initialized. {} records loaded.", count);
            Ok(reply::json(&msg).into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "reload failed");
            Ok(reply::with_status(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response())
        }
    }
}

async fn handle_last_position(id: String, t: String, db: SatDb) -> Result<Response, Infallible> {
    match query::last_position(&db, &id, &t).await {
        Ok(mark) => Ok(mark.to_string().into_response()),
        Err(e) => Ok(error_response(e)),
    }
}

async fn handle_closest(
    t: String,
    latitude: String,
    longitude: String,
    db: SatDb,
) -> Result<Response, Infallible> {
    match query::closest_satellite(&db, &t, &latitude, &longitude).await {
        Ok((mark, distance)) => {
            let body = ClosestReply {
                sat: mark.to_string(),
                distance,
            };
            Ok(reply::json(&body).into_response())
        }
        Err(e) => Ok(error_response(e)),
    }
}

fn error_response(e: SatError) -> Response {
    let status = match e {
        SatError::InvalidTimestamp | SatError::InvalidCoordinate { .. } => StatusCode::BAD_REQUEST,
        SatError::NoMatch => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %e, "request failed");
    }
    reply::with_status(e.to_string(), status).into_response()
}

fn with_db(db: SatDb) -> impl Filter<Extract = (SatDb,), Error = Infallible> + Clone {
    warp::any().map(move || db.clone())
}

fn with_dataset(
    dataset: Arc<PathBuf>,
) -> impl Filter<Extract = (Arc<PathBuf>,), Error = Infallible> + Clone {
    warp::any().map(move || dataset.clone())
}
