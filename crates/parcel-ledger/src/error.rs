//! Error types for the selection ledger.

use crate::ParcelId;
use thiserror::Error;

/// Rejections signalled by [`Ledger`](crate::Ledger) operations.
///
/// Both variants are recoverable: the ledger is left exactly as it was before
/// the call, and the caller is expected to surface the rejection to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Admitting the parcel would push the selection over the budget.
    #[error(
        "adding parcel {parcel} ({acreage} acres) would raise the selection to {prospective} acres, over the {budget} acre limit"
    )]
    BudgetExceeded {
        /// Parcel that was refused.
        parcel: ParcelId,
        /// Declared acreage of the refused parcel.
        acreage: f64,
        /// Total the selection would have reached.
        prospective: f64,
        /// Budget in force at the time of the attempt.
        budget: f64,
    },

    /// The requested budget is negative, not finite, or below the acreage
    /// already selected.
    #[error("development limit {requested} rejected: {selected} acres are already selected")]
    InvalidBudget {
        /// Value the user asked for.
        requested: f64,
        /// Acreage currently selected (the lowest acceptable budget).
        selected: f64,
        /// Budget that remains in force; the presented value reverts to this.
        current: f64,
    },
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
