//! # parcel-ledger
//!
//! Selection accounting for the growthlimit parcel picker.
//!
//! A user selects land parcels from a neighborhood catalog up to an acreage
//! budget (the development limit). [`Ledger`] owns that selection and is the
//! only place it is mutated:
//!
//! - [`Ledger::toggle`] selects or deselects a parcel, refusing additions that
//!   would exceed the budget.
//! - [`Ledger::set_budget`] edits the limit, refusing values below the acreage
//!   already selected.
//! - [`Ledger::reset_catalog`] clears the selection when the neighborhood
//!   changes; the budget is kept.
//! - [`Ledger::snapshot`] exposes the ordered selection for display and export.

mod error;
mod ledger;
mod parcel;

pub use error::{LedgerError, Result};
pub use ledger::{Ledger, Snapshot, ToggleOutcome, DEFAULT_BUDGET};
pub use parcel::{is_valid_acreage, NeighborhoodId, Parcel, ParcelId};
