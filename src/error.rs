// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Error types for ledger operations and snapshot persistence.
//!
//! Refusals (no stock, item not held) are not errors; see
//! [`Outcome`](crate::Outcome).

use crate::base::{BookHandle, LoanHandle, PatronHandle};
use thiserror::Error;

/// Caller misuse of the ledger's collections.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Book is not in the catalog (or the handle belongs to another ledger)
    #[error("book {0} not found")]
    BookNotFound(BookHandle),

    /// Patron is not in the registry (or the handle belongs to another ledger)
    #[error("patron {0} not found")]
    PatronNotFound(PatronHandle),

    /// Loan is not in the transaction log
    #[error("loan {0} not found")]
    LoanNotFound(LoanHandle),
}

/// Failures reading or writing a ledger snapshot.
///
/// Loading is all-or-nothing: any of these aborts the load and no partial
/// ledger is returned.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Snapshot file could not be read or written
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot is not valid JSON or does not match the record schema
    #[error("malformed snapshot: {0}")]
    Format(#[from] serde_json::Error),

    /// A transaction's `due_date` is neither `None` nor a timestamp
    #[error("invalid due date: {0:?}")]
    InvalidDueDate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        assert_eq!(
            LedgerError::BookNotFound(BookHandle(4)).to_string(),
            "book book#4 not found"
        );
        assert_eq!(
            LedgerError::PatronNotFound(PatronHandle(1)).to_string(),
            "patron patron#1 not found"
        );
        assert_eq!(
            LedgerError::LoanNotFound(LoanHandle(0)).to_string(),
            "loan loan#0 not found"
        );
        assert_eq!(
            SnapshotError::InvalidDueDate("tomorrow".into()).to_string(),
            "invalid due date: \"tomorrow\""
        );
    }

    #[test]
    fn errors_are_cloneable() {
        let error = LedgerError::BookNotFound(BookHandle(0));
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }

    #[test]
    fn json_errors_convert_into_format() {
        let json_error = serde_json::from_str::<u32>("nope").unwrap_err();
        let error: SnapshotError = json_error.into();
        assert!(matches!(error, SnapshotError::Format(_)));
    }
}
