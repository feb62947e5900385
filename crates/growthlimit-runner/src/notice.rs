//! Blocking notices shown to the user.
//!
//! A notice interrupts the user until acknowledged; none of them ends the
//! session. The message is what the user reads, the detail is the underlying
//! cause for logs.

use std::fmt;

/// Why a notice was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// A neighborhood catalog could not be loaded.
    FetchFailure,
    /// A parcel addition would break the development limit.
    BudgetExceeded,
    /// A budget edit fell below the selected acreage.
    InvalidBudget,
    /// A budget edit was negative or not a finite number.
    MalformedBudget,
    /// Export was requested with nothing selected.
    EmptyExport,
    /// Writing the export failed.
    ExportFailed,
    /// A clicked parcel is not in the rendered catalog.
    UnknownParcel,
    /// An input line could not be understood.
    InvalidCommand,
}

impl NoticeKind {
    /// Text shown for this kind of notice.
    pub fn message(&self) -> &'static str {
        match self {
            NoticeKind::FetchFailure => {
                "Error loading parcel data. Please make sure the neighborhood data exists."
            }
            NoticeKind::BudgetExceeded => "Adding this parcel would exceed the development limit.",
            NoticeKind::InvalidBudget => {
                "You have exceeded the development limit. Deselect parcels to continue."
            }
            NoticeKind::MalformedBudget => {
                "The development limit must be a non-negative number of acres."
            }
            NoticeKind::EmptyExport => "No parcels selected for download.",
            NoticeKind::ExportFailed => "Could not write the selected parcels.",
            NoticeKind::UnknownParcel => "That parcel is not on the map.",
            NoticeKind::InvalidCommand => "Unrecognized command. Type 'help' for a list.",
        }
    }
}

/// A user-facing notice.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub detail: Option<String>,
}

impl Notice {
    pub fn new(kind: NoticeKind) -> Self {
        Self { kind, detail: None }
    }

    pub fn with_detail(kind: NoticeKind, detail: impl fmt::Display) -> Self {
        Self {
            kind,
            detail: Some(detail.to_string()),
        }
    }

    pub fn message(&self) -> &'static str {
        self.kind.message()
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
