//! End-to-end tests over the HTTP surface, against an in-memory store.

use std::io::Write;
use std::path::PathBuf;

use sqlx::sqlite::SqlitePoolOptions;

use satrack::model::NewMark;
use satrack::{server, SatDb};

const T0: &str = "2021-01-01T00:00:00";

const BAD_TIMESTAMP_BODY: &str = "Incorrect data format, should be YYYY-MM-DDTHH:MM:SS";
const NO_MATCH_BODY: &str = "No satellites for the given parameters";

async fn test_db() -> SatDb {
    // One connection so every query sees the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let db = SatDb::from_pool(pool);
    db.ensure_schema().await.unwrap();
    db
}

fn mark(id: &str, longitude: f64, latitude: f64, creation_date: &str) -> NewMark {
    NewMark {
        id: id.to_string(),
        longitude,
        latitude,
        creation_date: creation_date.to_string(),
    }
}

fn routes(
    db: SatDb,
) -> impl warp::Filter<Extract = (warp::reply::Response,), Error = warp::Rejection> + Clone {
    server::routes(db, PathBuf::from("unused-dataset.json"))
}

fn dataset_file(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", json).unwrap();
    file
}

// --- VALIDATION ---

#[tokio::test]
async fn malformed_timestamp_is_rejected_on_both_endpoints() {
    let db = test_db().await;
    let api = routes(db);

    let res = warp::test::request()
        .path("/sat/lastposition/SAT-1/2021-01-01/")
        .reply(&api)
        .await;
    assert_eq!(res.status(), 400);
    assert_eq!(res.body(), BAD_TIMESTAMP_BODY);

    let res = warp::test::request()
        .path("/sat/closestfrom/01-01-2021T00:00:00/10.0/20.0")
        .reply(&api)
        .await;
    assert_eq!(res.status(), 400);
    assert_eq!(res.body(), BAD_TIMESTAMP_BODY);
}

#[tokio::test]
async fn malformed_coordinate_is_rejected() {
    let db = test_db().await;
    db.replace_all(&[mark("SAT-1", 10.0, 20.0, T0)]).await.unwrap();
    let api = routes(db);

    let res = warp::test::request()
        .path(&format!("/sat/closestfrom/{}/north/20.0", T0))
        .reply(&api)
        .await;
    assert_eq!(res.status(), 400);

    let res = warp::test::request()
        .path(&format!("/sat/closestfrom/{}/10.0/east", T0))
        .reply(&api)
        .await;
    assert_eq!(res.status(), 400);
}

// --- LAST POSITION ---

#[tokio::test]
async fn last_position_round_trip() {
    let db = test_db().await;
    db.replace_all(&[mark("SAT-1", 10.0, 20.0, T0)]).await.unwrap();
    let api = routes(db);

    let res = warp::test::request()
        .path(&format!("/sat/lastposition/SAT-1/{}/", T0))
        .reply(&api)
        .await;
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.body(),
        "Sat: SAT-1, longitude: 10, latitude: 20 creation_date: 2021-01-01T00:00:00"
    );

    // Same satellite, different timestamp: the match is exact, not at-or-before.
    let res = warp::test::request()
        .path("/sat/lastposition/SAT-1/2099-01-01T00:00:00/")
        .reply(&api)
        .await;
    assert_eq!(res.status(), 404);
    assert_eq!(res.body(), NO_MATCH_BODY);
}

#[tokio::test]
async fn last_position_works_without_trailing_slash() {
    let db = test_db().await;
    db.replace_all(&[mark("SAT-1", 10.0, 20.0, T0)]).await.unwrap();
    let api = routes(db);

    let res = warp::test::request()
        .path(&format!("/sat/lastposition/SAT-1/{}", T0))
        .reply(&api)
        .await;
    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn unknown_satellite_is_not_found() {
    let db = test_db().await;
    db.replace_all(&[mark("SAT-1", 10.0, 20.0, T0)]).await.unwrap();
    let api = routes(db);

    let res = warp::test::request()
        .path(&format!("/sat/lastposition/SAT-2/{}/", T0))
        .reply(&api)
        .await;
    assert_eq!(res.status(), 404);
    assert_eq!(res.body(), NO_MATCH_BODY);
}

#[tokio::test]
async fn duplicate_id_timestamp_pair_latest_insert_wins() {
    let db = test_db().await;
    db.replace_all(&[
        mark("SAT-1", 10.0, 20.0, T0),
        mark("SAT-1", 30.0, 40.0, T0),
    ])
    .await
    .unwrap();
    let api = routes(db);

    let res = warp::test::request()
        .path(&format!("/sat/lastposition/SAT-1/{}/", T0))
        .reply(&api)
        .await;
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.body(),
        "Sat: SAT-1, longitude: 30, latitude: 40 creation_date: 2021-01-01T00:00:00"
    );
}

// --- CLOSEST SATELLITE ---

#[tokio::test]
async fn closest_with_no_records_at_time_is_not_found() {
    let db = test_db().await;
    db.replace_all(&[mark("SAT-1", 10.0, 20.0, T0)]).await.unwrap();
    let api = routes(db);

    let res = warp::test::request()
        .path("/sat/closestfrom/2022-06-01T00:00:00/10.0/20.0")
        .reply(&api)
        .await;
    assert_eq!(res.status(), 404);
    assert_eq!(res.body(), NO_MATCH_BODY);
}

#[tokio::test]
async fn closest_picks_minimum_distance_candidate() {
    let db = test_db().await;
    // Query point sits exactly on NEAR; MID and FAR are ~50 km and ~100 km
    // further north along the same meridian.
    db.replace_all(&[
        mark("FAR", 10.0, 20.9, T0),
        mark("NEAR", 10.0, 20.0, T0),
        mark("MID", 10.0, 20.45, T0),
    ])
    .await
    .unwrap();
    let api = routes(db);

    let res = warp::test::request()
        .path(&format!("/sat/closestfrom/{}/20.0/10.0", T0))
        .reply(&api)
        .await;
    assert_eq!(res.status(), 200);

    let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
    let sat = body["sat"].as_str().unwrap();
    let distance = body["distance"].as_f64().unwrap();
    assert!(sat.starts_with("Sat: NEAR,"), "picked {}", sat);
    assert!(distance.abs() < 1e-6, "distance was {}", distance);
}

#[tokio::test]
async fn closest_tie_keeps_first_inserted_candidate() {
    let db = test_db().await;
    db.replace_all(&[
        mark("FIRST", 10.0, 20.0, T0),
        mark("SECOND", 10.0, 20.0, T0),
    ])
    .await
    .unwrap();
    let api = routes(db);

    let res = warp::test::request()
        .path(&format!("/sat/closestfrom/{}/20.0/10.0", T0))
        .reply(&api)
        .await;
    assert_eq!(res.status(), 200);

    let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
    assert!(body["sat"].as_str().unwrap().starts_with("Sat: FIRST,"));
}

#[tokio::test]
async fn closest_ignores_records_at_other_timestamps() {
    let db = test_db().await;
    db.replace_all(&[
        mark("ELSEWHEN", 10.0, 20.0, "2020-01-01T00:00:00"),
        mark("CANDIDATE", 50.0, 50.0, T0),
    ])
    .await
    .unwrap();
    let api = routes(db);

    // ELSEWHEN is right on the query point but recorded at a different time.
    let res = warp::test::request()
        .path(&format!("/sat/closestfrom/{}/20.0/10.0", T0))
        .reply(&api)
        .await;
    assert_eq!(res.status(), 200);

    let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
    assert!(body["sat"].as_str().unwrap().starts_with("Sat: CANDIDATE,"));
}

// --- SETUP / RELOAD ---

#[tokio::test]
async fn setup_loads_dataset_and_reports_count() {
    let db = test_db().await;
    let dataset = dataset_file(
        r#"[
            {"id": "SAT-1", "longitude": 10.0, "latitude": 20.0,
             "spaceTrack": {"CREATION_DATE": "2021-01-01T00:00:00"}},
            {"id": "SAT-2", "longitude": 30.0, "latitude": 40.0,
             "spaceTrack": {"CREATION_DATE": "2021-01-02T00:00:00"}}
        ]"#,
    );
    let api = server::routes(db, dataset.path().to_path_buf());

    let res = warp::test::request().path("/setup").reply(&api).await;
    assert_eq!(res.status(), 200);
    assert_eq!(res.body(), "\"Database initialized. 2 records loaded.\"");
}

#[tokio::test]
async fn reload_discards_the_previous_generation() {
    let db = test_db().await;
    db.replace_all(&[mark("OLD-SAT", 1.0, 2.0, T0)]).await.unwrap();

    let dataset = dataset_file(
        r#"[{"id": "NEW-SAT", "longitude": 10.0, "latitude": 20.0,
             "spaceTrack": {"CREATION_DATE": "2021-01-01T00:00:00"}}]"#,
    );
    let api = server::routes(db, dataset.path().to_path_buf());

    let res = warp::test::request().path("/setup").reply(&api).await;
    assert_eq!(res.status(), 200);

    let res = warp::test::request()
        .path(&format!("/sat/lastposition/OLD-SAT/{}/", T0))
        .reply(&api)
        .await;
    assert_eq!(res.status(), 404);

    let res = warp::test::request()
        .path(&format!("/sat/lastposition/NEW-SAT/{}/", T0))
        .reply(&api)
        .await;
    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn setup_with_missing_dataset_is_a_server_error() {
    let db = test_db().await;
    let api = server::routes(db, PathBuf::from("no/such/dataset.json"));

    let res = warp::test::request().path("/setup").reply(&api).await;
    assert_eq!(res.status(), 500);
}

#[tokio::test]
async fn setup_with_malformed_dataset_is_a_server_error() {
    let db = test_db().await;
    let dataset = dataset_file("{ definitely not a json array");
    let api = server::routes(db, dataset.path().to_path_buf());

    let res = warp::test::request().path("/setup").reply(&api).await;
    assert_eq!(res.status(), 500);
}
