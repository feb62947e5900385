//! Session behavior across neighborhood loads, budget edits and exports.

use growthlimit_runner::{
    CatalogResponse, Effect, FetchRequest, Highlight, Intent, Notice, NoticeKind, Session,
    SessionConfig,
};
use parcel_geo::{Catalog, GeoError};
use parcel_ledger::{NeighborhoodId, Parcel};
use std::path::PathBuf;
use std::time::Duration;

fn catalog(neighborhood: &str, parcels: &[(&str, f64)]) -> Catalog {
    Catalog::new(
        NeighborhoodId::new(neighborhood),
        parcels
            .iter()
            .map(|(pin, acres)| Parcel::new(*pin, *acres, neighborhood))
            .collect(),
    )
    .unwrap()
}

fn fetch(session: &mut Session, neighborhood: &str) -> FetchRequest {
    match &session.dispatch(Intent::NeighborhoodChanged(Some(neighborhood.into())))[..] {
        [Effect::Fetch(request)] => request.clone(),
        other => panic!("expected a fetch, got {:?}", other),
    }
}

fn arrived(request: &FetchRequest, result: Result<Catalog, GeoError>) -> CatalogResponse {
    CatalogResponse {
        seq: request.seq,
        neighborhood: request.neighborhood.clone(),
        result,
        elapsed: Duration::from_millis(12),
    }
}

fn notice_kinds(effects: &[Effect]) -> Vec<NoticeKind> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Notice(Notice { kind, .. }) => Some(*kind),
            _ => None,
        })
        .collect()
}

fn session_with_export(path: PathBuf) -> Session {
    let config = SessionConfig {
        export_path: path,
        ..SessionConfig::default()
    };
    Session::new(&config).unwrap()
}

#[test]
fn test_development_limit_scenario() {
    let mut session = Session::new(&SessionConfig::default()).unwrap();
    let request = fetch(&mut session, "Hough");
    session.catalog_arrived(arrived(
        &request,
        Ok(catalog("Hough", &[("A", 6.0), ("B", 5.0), ("C", 4.0)])),
    ));

    session.dispatch(Intent::ParcelClicked("A".into()));
    let refused = session.dispatch(Intent::ParcelClicked("B".into()));
    assert_eq!(notice_kinds(&refused), vec![NoticeKind::BudgetExceeded]);
    assert_eq!(session.ledger().total_acreage(), 6.0);

    session.dispatch(Intent::ParcelClicked("C".into()));
    assert_eq!(session.ledger().total_acreage(), 10.0);

    let removed = session.dispatch(Intent::ParcelClicked("A".into()));
    assert_eq!(removed[0], Effect::Highlight("A".into(), Highlight::Unselected));
    assert_eq!(session.ledger().total_acreage(), 4.0);

    let reverted = session.dispatch(Intent::BudgetEdited(3.0));
    assert_eq!(notice_kinds(&reverted), vec![NoticeKind::InvalidBudget]);
    assert_eq!(session.ledger().budget(), 10.0);

    let accepted = session.dispatch(Intent::BudgetEdited(4.0));
    assert!(notice_kinds(&accepted).is_empty());
    assert_eq!(session.ledger().budget(), 4.0);
}

#[test]
fn test_successful_fetch_clears_selection_keeps_budget() {
    let mut session = Session::new(&SessionConfig::default()).unwrap();
    let first = fetch(&mut session, "Hough");
    session.catalog_arrived(arrived(&first, Ok(catalog("Hough", &[("A", 3.0)]))));
    session.dispatch(Intent::ParcelClicked("A".into()));
    session.dispatch(Intent::BudgetEdited(7.5));

    let second = fetch(&mut session, "Fairfax");
    let effects = session.catalog_arrived(arrived(&second, Ok(catalog("Fairfax", &[("F", 1.0)]))));

    assert_eq!(effects, vec![Effect::CatalogShown, Effect::SelectionChanged]);
    assert!(session.ledger().is_empty());
    assert_eq!(session.ledger().total_acreage(), 0.0);
    assert_eq!(session.ledger().budget(), 7.5);
    assert_eq!(session.catalog().unwrap().neighborhood().as_str(), "Fairfax");
    assert!(session.pending().is_none());
}

#[test]
fn test_failed_fetch_leaves_selection_untouched() {
    let mut session = Session::new(&SessionConfig::default()).unwrap();
    let first = fetch(&mut session, "Hough");
    session.catalog_arrived(arrived(&first, Ok(catalog("Hough", &[("A", 3.0), ("B", 2.0)]))));
    session.dispatch(Intent::ParcelClicked("A".into()));

    let second = fetch(&mut session, "Atlantis");
    // Toggles against the rendered catalog stay valid while loading.
    session.dispatch(Intent::ParcelClicked("B".into()));

    let effects = session.catalog_arrived(arrived(
        &second,
        Err(GeoError::DownloadFailed {
            neighborhood: "Atlantis".to_string(),
            reason: "HTTP 404".to_string(),
        }),
    ));

    assert_eq!(notice_kinds(&effects), vec![NoticeKind::FetchFailure]);
    assert_eq!(session.ledger().len(), 2);
    assert_eq!(session.ledger().total_acreage(), 5.0);
    assert_eq!(session.catalog().unwrap().neighborhood().as_str(), "Hough");
}

#[test]
fn test_stale_response_dropped() {
    let mut session = Session::new(&SessionConfig::default()).unwrap();
    let hough = fetch(&mut session, "Hough");
    let fairfax = fetch(&mut session, "Fairfax");
    assert!(fairfax.seq > hough.seq);

    let effects = session.catalog_arrived(arrived(&fairfax, Ok(catalog("Fairfax", &[("F", 1.0)]))));
    assert_eq!(effects.len(), 2);
    session.dispatch(Intent::ParcelClicked("F".into()));

    let late = session.catalog_arrived(arrived(&hough, Ok(catalog("Hough", &[("H", 1.0)]))));
    assert!(late.is_empty());
    assert_eq!(session.catalog().unwrap().neighborhood().as_str(), "Fairfax");
    assert_eq!(session.ledger().len(), 1);
}

#[test]
fn test_stale_failure_dropped_silently() {
    let mut session = Session::new(&SessionConfig::default()).unwrap();
    let hough = fetch(&mut session, "Hough");
    let _fairfax = fetch(&mut session, "Fairfax");

    let effects = session.catalog_arrived(arrived(
        &hough,
        Err(GeoError::InvalidNeighborhood("Hough".to_string())),
    ));
    assert!(effects.is_empty());
    assert_eq!(session.pending().map(|n| n.as_str()), Some("Fairfax"));
}

#[test]
fn test_empty_export_notice_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("selected_parcels.geojson");
    let mut session = session_with_export(path.clone());

    let effects = session.dispatch(Intent::ExportRequested);
    assert_eq!(effects, vec![Effect::Notice(Notice::new(NoticeKind::EmptyExport))]);
    assert!(!path.exists());
}

#[test]
fn test_export_after_selection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("selected_parcels.geojson");
    let mut session = session_with_export(path.clone());
    let request = fetch(&mut session, "Hough");
    session.catalog_arrived(arrived(&request, Ok(catalog("Hough", &[("A", 2.0), ("B", 3.0)]))));
    session.dispatch(Intent::ParcelClicked("B".into()));
    session.dispatch(Intent::ParcelClicked("A".into()));

    let effects = session.dispatch(Intent::ExportRequested);
    let summary = match &effects[..] {
        [Effect::Exported(summary)] => summary.clone(),
        other => panic!("expected an export, got {:?}", other),
    };
    assert_eq!(summary.features, 2);
    assert_eq!(summary.total_acreage, 5.0);
    assert_eq!(summary.path, path);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let features = written["features"].as_array().unwrap();
    assert_eq!(features[0]["properties"]["id"], "B");
    assert_eq!(features[1]["properties"]["id"], "A");
}
