//! Presentation of the session: parcel highlight state, tooltips and the
//! selection sidebar.

use parcel_geo::Catalog;
use parcel_ledger::{Parcel, ParcelId, Snapshot};
use serde_json::Value;
use std::collections::BTreeMap;

/// Visual state of a rendered parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Selected,
    Unselected,
}

impl Highlight {
    pub fn from_selected(selected: bool) -> Self {
        if selected {
            Highlight::Selected
        } else {
            Highlight::Unselected
        }
    }

    pub fn fill_color(&self) -> &'static str {
        match self {
            Highlight::Selected => "red",
            Highlight::Unselected => "#3388ff",
        }
    }

    pub fn fill_opacity(&self) -> f64 {
        match self {
            Highlight::Selected => 0.7,
            Highlight::Unselected => 0.5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Highlight::Selected => "selected",
            Highlight::Unselected => "unselected",
        }
    }
}

/// Format a feature property for display.
fn display_property(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "n/a".to_string(),
        Some(other) => other.to_string(),
    }
}

/// The rendered layer: one highlight per parcel of the displayed catalog.
#[derive(Debug, Clone)]
pub struct MapView {
    score_property: String,
    layer: BTreeMap<ParcelId, Highlight>,
}

impl MapView {
    pub fn new(score_property: impl Into<String>) -> Self {
        Self {
            score_property: score_property.into(),
            layer: BTreeMap::new(),
        }
    }

    /// Replace the layer with `catalog`, every parcel unselected.
    pub fn render_catalog(&mut self, catalog: &Catalog) {
        self.layer = catalog
            .parcels()
            .iter()
            .map(|parcel| (parcel.id().clone(), Highlight::Unselected))
            .collect();
    }

    /// Remove the layer.
    pub fn clear(&mut self) {
        self.layer.clear();
    }

    /// Restyle one parcel. Parcels not on the layer are ignored.
    pub fn set_highlight(&mut self, parcel: &ParcelId, highlight: Highlight) {
        if let Some(state) = self.layer.get_mut(parcel) {
            *state = highlight;
        }
    }

    pub fn highlight(&self, parcel: &ParcelId) -> Option<Highlight> {
        self.layer.get(parcel).copied()
    }

    pub fn rendered(&self) -> usize {
        self.layer.len()
    }

    pub fn selected_count(&self) -> usize {
        self.layer.values().filter(|h| **h == Highlight::Selected).count()
    }

    /// Hover text for a parcel.
    pub fn tooltip(&self, parcel: &Parcel) -> String {
        format!(
            "Parcel ID: {}<br>Acres: {}<br>TOD Score: {}",
            parcel.id(),
            parcel.acreage(),
            display_property(parcel.property(&self.score_property))
        )
    }

    /// One sidebar line per selected parcel, in selection order.
    pub fn sidebar_lines(&self, snapshot: &Snapshot<'_>) -> Vec<String> {
        snapshot
            .parcels
            .iter()
            .map(|parcel| {
                format!(
                    "Parcel ID: {}, Acres: {}, TOD Score: {}",
                    parcel.id(),
                    parcel.acreage(),
                    display_property(parcel.property(&self.score_property))
                )
            })
            .collect()
    }

    /// Totals line shown under the sidebar.
    pub fn summary_line(&self, snapshot: &Snapshot<'_>) -> String {
        format!(
            "Selected: {} parcel(s), {} of {} acres",
            snapshot.len(),
            snapshot.total_acreage,
            snapshot.budget
        )
    }

    /// Lines for the `parcels` command: every rendered parcel with its state.
    pub fn layer_lines(&self, catalog: &Catalog) -> Vec<String> {
        catalog
            .parcels()
            .iter()
            .map(|parcel| {
                let state = self.highlight(parcel.id()).unwrap_or(Highlight::Unselected);
                format!(
                    "[{}] {}",
                    if state == Highlight::Selected { "x" } else { " " },
                    self.tooltip(parcel).replace("<br>", ", ")
                )
            })
            .collect()
    }
}
