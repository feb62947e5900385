//! The selection session.
//!
//! A [`Session`] owns the ledger and the catalog currently on the map, and
//! turns intents and catalog responses into [`Effect`]s for the front end to
//! carry out. It never blocks: loading a neighborhood only issues a
//! [`FetchRequest`], and the matching [`CatalogResponse`] is fed back later
//! through [`Session::catalog_arrived`].
//!
//! While a fetch is in flight the previous catalog stays on the map and can
//! still be toggled. The selection is cleared only when a new catalog is
//! installed; a failed fetch leaves everything as it was.

use crate::config::SessionConfig;
use crate::loader::{CatalogResponse, FetchRequest};
use crate::notice::{Notice, NoticeKind};
use crate::view::Highlight;
use crate::{Intent, Result, RunnerError};
use growthlimit_metrics::metric_defs::*;
use growthlimit_metrics::NeighborhoodLabels;
use parcel_geo::{export_selection, Catalog, ExportSummary, GeoError};
use parcel_ledger::{Ledger, LedgerError, NeighborhoodId, ParcelId};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Something the front end must do after an intent or response.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Start loading a catalog.
    Fetch(FetchRequest),
    /// Show a blocking notice.
    Notice(Notice),
    /// A new catalog was installed; render it with every parcel unselected.
    CatalogShown,
    /// The map was cleared.
    CatalogCleared,
    /// Restyle one parcel.
    Highlight(ParcelId, Highlight),
    /// Selected parcels or totals changed; refresh the sidebar.
    SelectionChanged,
    /// Display this budget value (after an edit or a revert).
    BudgetShown(f64),
    /// The selection was written to disk.
    Exported(ExportSummary),
}

/// Selection state and the rules that change it.
#[derive(Debug)]
pub struct Session {
    ledger: Ledger,
    catalog: Option<Catalog>,
    /// Neighborhood of the newest outstanding request.
    pending: Option<NeighborhoodId>,
    /// Sequence number of the newest request or clear.
    latest_seq: u64,
    drop_stale_responses: bool,
    export_path: PathBuf,
}

impl Session {
    /// Create a session from a validated config.
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let ledger = Ledger::new(config.default_budget).map_err(|e| {
            RunnerError::Config(format!("default_budget rejected: {}", e))
        })?;
        Ok(Self {
            ledger,
            catalog: None,
            pending: None,
            latest_seq: 0,
            drop_stale_responses: config.drop_stale_responses,
            export_path: config.export_path.clone(),
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Catalog currently on the map.
    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    /// Neighborhood being loaded, if a fetch is outstanding.
    pub fn pending(&self) -> Option<&NeighborhoodId> {
        self.pending.as_ref()
    }

    pub fn export_path(&self) -> &Path {
        &self.export_path
    }

    fn labels(&self) -> NeighborhoodLabels {
        match &self.catalog {
            Some(catalog) => NeighborhoodLabels::new(catalog.neighborhood().as_str()),
            None => NeighborhoodLabels::none(),
        }
    }

    fn record_acreage(&self) {
        metrics::gauge!(SELECTED_ACREAGE.name, &self.labels().to_labels())
            .set(self.ledger.total_acreage());
    }

    /// Apply a user intent.
    pub fn dispatch(&mut self, intent: Intent) -> Vec<Effect> {
        match intent {
            Intent::NeighborhoodChanged(Some(neighborhood)) => self.request_catalog(neighborhood),
            Intent::NeighborhoodChanged(None) => self.clear_catalog(),
            Intent::BudgetEdited(budget) => self.edit_budget(budget),
            Intent::ParcelClicked(parcel) => self.click_parcel(&parcel),
            Intent::ExportRequested => self.export(),
        }
    }

    fn request_catalog(&mut self, neighborhood: NeighborhoodId) -> Vec<Effect> {
        self.latest_seq += 1;
        self.pending = Some(neighborhood.clone());
        debug!(seq = self.latest_seq, neighborhood = %neighborhood, "catalog requested");
        vec![Effect::Fetch(FetchRequest {
            seq: self.latest_seq,
            neighborhood,
        })]
    }

    fn clear_catalog(&mut self) -> Vec<Effect> {
        // Outstanding responses are now stale.
        self.latest_seq += 1;
        self.pending = None;
        self.catalog = None;
        self.ledger.reset_catalog();
        self.record_acreage();
        info!("map cleared");
        vec![Effect::CatalogCleared, Effect::SelectionChanged]
    }

    fn edit_budget(&mut self, budget: f64) -> Vec<Effect> {
        match self.ledger.set_budget(budget) {
            Ok(()) => {
                metrics::counter!(BUDGET_EDITS.name).increment(1);
                debug!(budget, "development limit set");
                vec![Effect::BudgetShown(budget), Effect::SelectionChanged]
            }
            Err(err) => {
                metrics::counter!(BUDGET_REJECTED.name).increment(1);
                warn!(%err, "budget edit reverted");
                let kind = if budget.is_finite() && budget >= 0.0 {
                    NoticeKind::InvalidBudget
                } else {
                    NoticeKind::MalformedBudget
                };
                vec![
                    Effect::BudgetShown(self.ledger.budget()),
                    Effect::Notice(Notice::with_detail(kind, err)),
                ]
            }
        }
    }

    fn click_parcel(&mut self, id: &ParcelId) -> Vec<Effect> {
        let labels = self.labels().to_labels();
        let Some(parcel) = self.catalog.as_ref().and_then(|c| c.get(id)) else {
            return vec![Effect::Notice(Notice::with_detail(
                NoticeKind::UnknownParcel,
                format!("parcel {} is not in the loaded catalog", id),
            ))];
        };

        match self.ledger.toggle(parcel) {
            Ok(outcome) => {
                if outcome.is_selected() {
                    metrics::counter!(PARCELS_SELECTED.name, &labels).increment(1);
                } else {
                    metrics::counter!(PARCELS_UNSELECTED.name, &labels).increment(1);
                }
                self.record_acreage();
                vec![
                    Effect::Highlight(id.clone(), Highlight::from_selected(outcome.is_selected())),
                    Effect::SelectionChanged,
                ]
            }
            Err(err @ LedgerError::BudgetExceeded { .. }) => {
                metrics::counter!(BUDGET_EXCEEDED.name, &labels).increment(1);
                debug!(%err, "parcel refused");
                vec![Effect::Notice(Notice::with_detail(NoticeKind::BudgetExceeded, err))]
            }
            Err(err) => {
                warn!(%err, "unexpected ledger rejection");
                vec![Effect::Notice(Notice::with_detail(NoticeKind::BudgetExceeded, err))]
            }
        }
    }

    fn export(&mut self) -> Vec<Effect> {
        match export_selection(&self.ledger.snapshot(), &self.export_path) {
            Ok(summary) => {
                metrics::counter!(EXPORTS.name).increment(1);
                vec![Effect::Exported(summary)]
            }
            Err(GeoError::EmptyExport) => {
                metrics::counter!(EXPORTS_EMPTY.name).increment(1);
                vec![Effect::Notice(Notice::new(NoticeKind::EmptyExport))]
            }
            Err(err) => {
                warn!(path = %self.export_path.display(), %err, "export failed");
                vec![Effect::Notice(Notice::with_detail(NoticeKind::ExportFailed, err))]
            }
        }
    }

    /// Apply a catalog response from the loader.
    pub fn catalog_arrived(&mut self, response: CatalogResponse) -> Vec<Effect> {
        let labels = NeighborhoodLabels::new(response.neighborhood.as_str()).to_labels();
        metrics::histogram!(CATALOG_FETCH_TIME.name, &labels)
            .record(response.elapsed.as_secs_f64() * 1000.0);

        if self.drop_stale_responses && response.seq != self.latest_seq {
            metrics::counter!(CATALOG_STALE.name, &labels).increment(1);
            debug!(
                seq = response.seq,
                latest = self.latest_seq,
                neighborhood = %response.neighborhood,
                "stale catalog response dropped"
            );
            return Vec::new();
        }
        if response.seq == self.latest_seq {
            self.pending = None;
        }

        match response.result {
            Ok(catalog) => {
                metrics::counter!(CATALOG_LOADS.name, &labels).increment(1);
                info!(
                    neighborhood = %response.neighborhood,
                    parcels = catalog.len(),
                    elapsed_ms = response.elapsed.as_millis() as u64,
                    "catalog loaded"
                );
                self.ledger.reset_catalog();
                self.catalog = Some(catalog);
                self.record_acreage();
                vec![Effect::CatalogShown, Effect::SelectionChanged]
            }
            Err(err) => {
                metrics::counter!(CATALOG_FAILURES.name, &labels).increment(1);
                warn!(neighborhood = %response.neighborhood, %err, "catalog load failed");
                vec![Effect::Notice(Notice::with_detail(NoticeKind::FetchFailure, err))]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parcel_ledger::Parcel;
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

    fn response(seq: u64, result: std::result::Result<Catalog, GeoError>) -> CatalogResponse {
        let neighborhood = match &result {
            Ok(c) => c.neighborhood().clone(),
            Err(_) => NeighborhoodId::new("missing"),
        };
        CatalogResponse {
            seq,
            neighborhood,
            result,
            elapsed: Duration::from_millis(5),
        }
    }

    fn loaded(parcels: &[(&str, f64)]) -> Session {
        let mut session = Session::new(&SessionConfig::default()).unwrap();
        let effects = session.dispatch(Intent::NeighborhoodChanged(Some("Hough".into())));
        assert_eq!(effects.len(), 1);
        session.catalog_arrived(response(1, Ok(catalog("Hough", parcels))));
        session
    }

    #[test]
    fn test_request_issues_fetch() {
        let mut session = Session::new(&SessionConfig::default()).unwrap();
        let effects = session.dispatch(Intent::NeighborhoodChanged(Some("Hough".into())));
        assert_eq!(
            effects,
            vec![Effect::Fetch(FetchRequest { seq: 1, neighborhood: "Hough".into() })]
        );
        assert_eq!(session.pending().map(|n| n.as_str()), Some("Hough"));
        assert!(session.catalog().is_none());
    }

    #[test]
    fn test_click_unknown_parcel() {
        let mut session = loaded(&[("A", 1.0)]);
        let effects = session.dispatch(Intent::ParcelClicked("Z".into()));
        assert!(matches!(
            &effects[..],
            [Effect::Notice(Notice { kind: NoticeKind::UnknownParcel, .. })]
        ));
    }

    #[test]
    fn test_click_toggles_highlight() {
        let mut session = loaded(&[("A", 6.0), ("B", 5.0)]);
        assert_eq!(
            session.dispatch(Intent::ParcelClicked("A".into())),
            vec![Effect::Highlight("A".into(), Highlight::Selected), Effect::SelectionChanged]
        );
        let refused = session.dispatch(Intent::ParcelClicked("B".into()));
        assert!(matches!(
            &refused[..],
            [Effect::Notice(Notice { kind: NoticeKind::BudgetExceeded, .. })]
        ));
        assert_eq!(
            session.dispatch(Intent::ParcelClicked("A".into())),
            vec![Effect::Highlight("A".into(), Highlight::Unselected), Effect::SelectionChanged]
        );
        assert_eq!(session.ledger().total_acreage(), 0.0);
    }

    #[test]
    fn test_budget_revert_shows_current_value() {
        let mut session = loaded(&[("A", 6.0)]);
        session.dispatch(Intent::ParcelClicked("A".into()));

        let effects = session.dispatch(Intent::BudgetEdited(3.0));
        assert_eq!(effects[0], Effect::BudgetShown(10.0));
        assert!(matches!(
            &effects[1],
            Effect::Notice(Notice { kind: NoticeKind::InvalidBudget, .. })
        ));
        assert_eq!(session.ledger().budget(), 10.0);

        assert_eq!(session.dispatch(Intent::BudgetEdited(6.0))[0], Effect::BudgetShown(6.0));
        assert_eq!(session.ledger().budget(), 6.0);
    }

    #[test]
    fn test_malformed_budget_notice() {
        let mut session = loaded(&[("A", 6.0)]);
        session.dispatch(Intent::ParcelClicked("A".into()));

        for value in [-2.0, f64::NAN, f64::INFINITY] {
            let effects = session.dispatch(Intent::BudgetEdited(value));
            assert_eq!(effects[0], Effect::BudgetShown(10.0));
            assert!(matches!(
                &effects[1],
                Effect::Notice(Notice { kind: NoticeKind::MalformedBudget, .. })
            ));
        }
        assert_eq!(session.ledger().budget(), 10.0);
    }

    #[test]
    fn test_clear_resets_selection_keeps_budget() {
        let mut session = loaded(&[("A", 2.0)]);
        session.dispatch(Intent::BudgetEdited(4.0));
        session.dispatch(Intent::ParcelClicked("A".into()));

        let effects = session.dispatch(Intent::NeighborhoodChanged(None));
        assert_eq!(effects, vec![Effect::CatalogCleared, Effect::SelectionChanged]);
        assert!(session.catalog().is_none());
        assert!(session.ledger().is_empty());
        assert_eq!(session.ledger().budget(), 4.0);
    }

    #[test]
    fn test_clear_makes_outstanding_fetch_stale() {
        let mut session = Session::new(&SessionConfig::default()).unwrap();
        session.dispatch(Intent::NeighborhoodChanged(Some("Hough".into())));
        session.dispatch(Intent::NeighborhoodChanged(None));

        let effects = session.catalog_arrived(response(1, Ok(catalog("Hough", &[("A", 1.0)]))));
        assert!(effects.is_empty());
        assert!(session.catalog().is_none());
    }

    #[test]
    fn test_last_arrival_wins_without_stale_drop() {
        let config = SessionConfig {
            drop_stale_responses: false,
            ..SessionConfig::default()
        };
        let mut session = Session::new(&config).unwrap();
        session.dispatch(Intent::NeighborhoodChanged(Some("Hough".into())));
        session.dispatch(Intent::NeighborhoodChanged(Some("Fairfax".into())));

        session.catalog_arrived(response(2, Ok(catalog("Fairfax", &[("F", 1.0)]))));
        session.catalog_arrived(response(1, Ok(catalog("Hough", &[("H", 1.0)]))));
        assert_eq!(session.catalog().unwrap().neighborhood().as_str(), "Hough");
    }
}
