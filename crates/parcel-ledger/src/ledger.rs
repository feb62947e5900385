//! The selection ledger: selected parcels, their running acreage, and the
//! development limit that caps it.
//!
//! ## Rules
//!
//! - Deselecting a member is always allowed.
//! - Selecting a parcel is allowed only if the new total stays at or under the
//!   budget (the ceiling is inclusive).
//! - The budget can never be lowered below the acreage already selected.
//! - Resetting the catalog empties the selection but keeps the budget.
//!
//! Together these keep `total_acreage <= budget` true at every observable
//! point, and `total_acreage` equal to the sum of member acreages.

use crate::{LedgerError, Parcel, ParcelId, Result};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Budget used when nothing else is configured, in acres.
pub const DEFAULT_BUDGET: f64 = 10.0;

/// Result of a successful [`Ledger::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The parcel is now part of the selection.
    Selected,
    /// The parcel is no longer part of the selection.
    Unselected,
}

impl ToggleOutcome {
    pub fn is_selected(self) -> bool {
        matches!(self, ToggleOutcome::Selected)
    }
}

/// Read-only view of the selection, in insertion order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot<'a> {
    /// Selected parcels, oldest selection first.
    pub parcels: &'a [Parcel],
    /// Sum of the selected parcels' acreage.
    pub total_acreage: f64,
    /// Budget in force when the snapshot was taken.
    pub budget: f64,
}

impl Snapshot<'_> {
    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.parcels.len()
    }
}

/// Owns the user's selection and enforces the acreage budget.
///
/// All mutation goes through [`toggle`](Ledger::toggle),
/// [`set_budget`](Ledger::set_budget) and
/// [`reset_catalog`](Ledger::reset_catalog). Operations are synchronous and
/// leave the ledger untouched when they return an error.
///
/// # Example
///
/// ```
/// use parcel_ledger::{Ledger, Parcel, ToggleOutcome};
///
/// let mut ledger = Ledger::new(10.0)?;
/// let parcel = Parcel::new("004-12-031", 6.0, "hough");
///
/// assert_eq!(ledger.toggle(&parcel)?, ToggleOutcome::Selected);
/// assert_eq!(ledger.total_acreage(), 6.0);
/// assert!(ledger.set_budget(5.0).is_err());
/// # Ok::<(), parcel_ledger::LedgerError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Ledger {
    /// Selected parcels in insertion order.
    members: Vec<Parcel>,
    /// Ids of `members`, for constant-time membership checks.
    index: HashSet<ParcelId>,
    /// Running sum of member acreage.
    total_acreage: f64,
    /// Inclusive acreage ceiling.
    budget: f64,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            members: Vec::new(),
            index: HashSet::new(),
            total_acreage: 0.0,
            budget: DEFAULT_BUDGET,
        }
    }
}

impl Ledger {
    /// Create an empty ledger with the given budget.
    ///
    /// Fails with [`LedgerError::InvalidBudget`] if the budget is negative or
    /// not finite.
    pub fn new(budget: f64) -> Result<Self> {
        let mut ledger = Self::default();
        ledger.set_budget(budget)?;
        Ok(ledger)
    }

    /// Select the parcel if it is not selected, deselect it otherwise.
    ///
    /// Selecting fails with [`LedgerError::BudgetExceeded`] when the new total
    /// would exceed the budget; the selection is then unchanged. Deselecting
    /// always succeeds.
    pub fn toggle(&mut self, parcel: &Parcel) -> Result<ToggleOutcome> {
        if self.index.contains(parcel.id()) {
            self.remove(parcel.id());
            return Ok(ToggleOutcome::Unselected);
        }

        let prospective = self.total_acreage + parcel.acreage();
        if prospective.is_nan() || prospective > self.budget {
            debug!(
                parcel = %parcel.id(),
                prospective,
                budget = self.budget,
                "parcel rejected: development limit"
            );
            return Err(LedgerError::BudgetExceeded {
                parcel: parcel.id().clone(),
                acreage: parcel.acreage(),
                prospective,
                budget: self.budget,
            });
        }

        self.index.insert(parcel.id().clone());
        self.members.push(parcel.clone());
        self.total_acreage = prospective;
        trace!(parcel = %parcel.id(), total = self.total_acreage, "parcel selected");
        Ok(ToggleOutcome::Selected)
    }

    /// Replace the budget.
    ///
    /// Fails with [`LedgerError::InvalidBudget`] if `budget` is negative, not
    /// finite, or below the acreage already selected. Membership is never
    /// changed by this call.
    pub fn set_budget(&mut self, budget: f64) -> Result<()> {
        if !budget.is_finite() || budget < 0.0 || budget < self.total_acreage {
            debug!(
                requested = budget,
                selected = self.total_acreage,
                "budget edit rejected"
            );
            return Err(LedgerError::InvalidBudget {
                requested: budget,
                selected: self.total_acreage,
                current: self.budget,
            });
        }
        self.budget = budget;
        Ok(())
    }

    /// Drop every selected parcel. The budget is kept.
    pub fn reset_catalog(&mut self) {
        if !self.members.is_empty() {
            debug!(cleared = self.members.len(), "selection cleared");
        }
        self.members.clear();
        self.index.clear();
        self.total_acreage = 0.0;
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            parcels: &self.members,
            total_acreage: self.total_acreage,
            budget: self.budget,
        }
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn total_acreage(&self) -> f64 {
        self.total_acreage
    }

    /// Acreage that can still be selected before reaching the budget.
    pub fn remaining(&self) -> f64 {
        (self.budget - self.total_acreage).max(0.0)
    }

    pub fn contains(&self, id: &ParcelId) -> bool {
        self.index.contains(id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn remove(&mut self, id: &ParcelId) {
        self.index.remove(id);
        if let Some(pos) = self.members.iter().position(|p| p.id() == id) {
            self.members.remove(pos);
            // Re-sum in selection order so no subtraction error accumulates.
            self.total_acreage = if self.members.is_empty() {
                0.0
            } else {
                self.members.iter().map(Parcel::acreage).sum()
            };
            trace!(parcel = %id, total = self.total_acreage, "parcel deselected");
        }
    }
}
