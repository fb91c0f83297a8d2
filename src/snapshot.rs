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

//! Snapshot persistence.
//!
//! A snapshot is one JSON document holding the whole ledger:
//!
//! ```json
//! {
//!   "books": [{"title": "Dune", "author": "Herbert", "isbn": "111", "quantity": 1}],
//!   "patrons": [{"name": "Alice", "id": "p1", "contact_info": "a@x.com",
//!                "borrowed_books": [{"title": "Dune", "...": "..."}]}],
//!   "transactions": [{"book": {"...": "..."}, "patron": {"...": "..."},
//!                     "due_date": "2024-01-24 12:00:00"}]
//! }
//! ```
//!
//! Held copies and each transaction's book and patron are written as full
//! nested records, not references. Loading therefore cannot tell that they
//! were the same entities as the catalog's: nested records become new,
//! uncataloged entities in the reloaded ledger. Within one transaction the
//! link survives: the loan's book is the first of its own patron's held
//! copies with equal fields, if there is one.
//!
//! Records are strict. Missing or unknown keys fail the whole load.

use crate::base::PatronHandle;
use crate::book::Book;
use crate::error::SnapshotError;
use crate::ledger::Ledger;
use crate::loan::Loan;
use crate::patron::Patron;
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Written in place of a due date for loans that never checked out.
const NO_DUE_DATE: &str = "None";
const DUE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DUE_DATE_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatronRecord {
    pub name: String,
    pub id: String,
    pub contact_info: String,
    pub borrowed_books: Vec<BookRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoanRecord {
    pub book: BookRecord,
    pub patron: PatronRecord,
    /// See [`format_due_date`].
    pub due_date: String,
}

/// The full persisted state of a [`Ledger`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    pub books: Vec<BookRecord>,
    pub patrons: Vec<PatronRecord>,
    pub transactions: Vec<LoanRecord>,
}

/// Formats a due date as `YYYY-MM-DD HH:MM:SS[.ffffff]`, or `None`.
///
/// The fraction is written with microsecond precision and omitted when it is
/// zero.
pub fn format_due_date(due_date: Option<NaiveDateTime>) -> String {
    let Some(due_date) = due_date else {
        return NO_DUE_DATE.to_string();
    };
    let micros = due_date.nanosecond() / 1_000;
    let seconds = due_date.format(DUE_DATE_FORMAT);
    if micros == 0 {
        seconds.to_string()
    } else {
        format!("{seconds}.{micros:06}")
    }
}

/// Inverse of [`format_due_date`].
///
/// # Errors
///
/// [`SnapshotError::InvalidDueDate`] if `text` is neither `None` nor a
/// timestamp.
pub fn parse_due_date(text: &str) -> Result<Option<NaiveDateTime>, SnapshotError> {
    if text == NO_DUE_DATE {
        return Ok(None);
    }
    NaiveDateTime::parse_from_str(text, DUE_DATE_PARSE_FORMAT)
        .map(Some)
        .map_err(|_| SnapshotError::InvalidDueDate(text.to_string()))
}

impl Loan {
    /// Builds the persisted form, embedding the book and patron records.
    ///
    /// Returns `None` if a handle does not resolve in `ledger`.
    pub fn to_record(&self, ledger: &Ledger) -> Option<LoanRecord> {
        let book = ledger.book(self.book())?;
        let patron = ledger.patron(self.patron())?;
        Some(LoanRecord {
            book: book.to_record(),
            patron: patron.to_record(ledger),
            due_date: format_due_date(self.due_date()),
        })
    }
}

impl Ledger {
    /// Captures catalog, registry and transaction log, in that order.
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            books: self.books().map(|(_, book)| book.to_record()).collect(),
            patrons: self
                .patrons()
                .map(|(_, patron)| patron.to_record(self))
                .collect(),
            transactions: self
                .transactions()
                .iter()
                .filter_map(|loan| loan.to_record(self))
                .collect(),
        }
    }

    /// Rebuilds a ledger from a snapshot.
    ///
    /// Catalog and registry entries are restored in order. Nested records
    /// (held copies, a transaction's book and patron) are restored as separate
    /// uncataloged entities, except that a transaction's book reuses a matching
    /// held copy of the transaction's patron.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::InvalidDueDate`] if any transaction's due date is
    /// unreadable.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, SnapshotError> {
        let mut ledger = Ledger::new();

        for record in snapshot.books {
            let handle = ledger.push_book(record.into());
            ledger.catalog_book(handle);
        }
        for record in snapshot.patrons {
            let handle = ledger.restore_patron(record);
            ledger.register_patron(handle);
        }
        for record in snapshot.transactions {
            let due_date = parse_due_date(&record.due_date)?;
            let patron = ledger.restore_patron(record.patron);
            let book = Book::from(record.book);
            // Point at the patron's own held copy so the loan still reads Active.
            let held = ledger.patron(patron).and_then(|restored| {
                restored
                    .borrowed()
                    .iter()
                    .copied()
                    .find(|handle| ledger.book(*handle) == Some(&book))
            });
            let book = match held {
                Some(handle) => handle,
                None => ledger.push_book(book),
            };
            ledger.push_loan(Loan::restored(book, patron, due_date));
        }

        Ok(ledger)
    }

    /// Serializes the full ledger state to a JSON document.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::Format`] if JSON encoding fails.
    pub fn serialize(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(&self.to_snapshot())?)
    }

    /// Parses a JSON document produced by [`Ledger::serialize`].
    ///
    /// The returned ledger uses the system clock and standard policy.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::Format`] for invalid JSON, missing or unknown keys;
    /// [`SnapshotError::InvalidDueDate`] for unreadable due dates.
    pub fn deserialize(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }

    /// Writes the snapshot to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::Io`] if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        std::fs::write(path, self.serialize()?)?;
        tracing::info!(
            path = %path.display(),
            books = self.catalog().len(),
            patrons = self.registry().len(),
            transactions = self.transactions().len(),
            "saved snapshot"
        );
        Ok(())
    }

    /// Reads a snapshot from `path`.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::Io`] if the file cannot be read, otherwise as
    /// [`Ledger::deserialize`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let ledger = Self::deserialize(&std::fs::read_to_string(path)?)?;
        tracing::info!(
            path = %path.display(),
            books = ledger.catalog().len(),
            patrons = ledger.registry().len(),
            transactions = ledger.transactions().len(),
            "loaded snapshot"
        );
        Ok(ledger)
    }

    fn restore_patron(&mut self, record: PatronRecord) -> PatronHandle {
        let mut patron = Patron::new(record.name, record.id, record.contact_info);
        for book in record.borrowed_books {
            patron.borrow(self.push_book(Book::from(book)));
        }
        self.push_patron(patron)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn instant(micros: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 24)
            .unwrap()
            .and_hms_micro_opt(12, 0, 5, micros)
            .unwrap()
    }

    #[test]
    fn due_date_text_forms() {
        assert_eq!(format_due_date(None), "None");
        assert_eq!(format_due_date(Some(instant(0))), "2024-01-24 12:00:05");
        assert_eq!(
            format_due_date(Some(instant(1_500))),
            "2024-01-24 12:00:05.001500"
        );
    }

    #[test]
    fn due_date_parses_both_forms() {
        assert_eq!(parse_due_date("None").unwrap(), None);
        assert_eq!(
            parse_due_date("2024-01-24 12:00:05").unwrap(),
            Some(instant(0))
        );
        assert_eq!(
            parse_due_date("2024-01-24 12:00:05.001500").unwrap(),
            Some(instant(1_500))
        );
    }

    #[test]
    fn unreadable_due_date_is_rejected() {
        let error = parse_due_date("next tuesday").unwrap_err();
        assert!(matches!(error, SnapshotError::InvalidDueDate(text) if text == "next tuesday"));
    }

    #[test]
    fn unknown_book_keys_are_rejected() {
        let json = r#"{"books":[{"title":"Dune","author":"Herbert","isbn":"111","quantity":1,"shelf":"A"}],
                       "patrons":[],"transactions":[]}"#;
        assert!(matches!(
            Ledger::deserialize(json),
            Err(SnapshotError::Format(_))
        ));
    }

    #[test]
    fn missing_keys_are_rejected() {
        let json = r#"{"books":[{"title":"Dune","author":"Herbert","isbn":"111"}],
                       "patrons":[],"transactions":[]}"#;
        assert!(matches!(
            Ledger::deserialize(json),
            Err(SnapshotError::Format(_))
        ));

        let json = r#"{"books":[],"patrons":[]}"#;
        assert!(matches!(
            Ledger::deserialize(json),
            Err(SnapshotError::Format(_))
        ));
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let json = r#"{"books":[{"title":"Dune","author":"Herbert","isbn":"111","quantity":-1}],
                       "patrons":[],"transactions":[]}"#;
        assert!(matches!(
            Ledger::deserialize(json),
            Err(SnapshotError::Format(_))
        ));
    }

    #[test]
    fn empty_ledger_serializes_to_empty_arrays() {
        let json = Ledger::new().serialize().unwrap();
        assert_eq!(json, r#"{"books":[],"patrons":[],"transactions":[]}"#);
    }

    #[test]
    fn unsettled_loan_is_written_with_none() {
        let mut ledger = Ledger::new();
        let book = ledger.add_book(Book::new("Dune", "Herbert", "111", 0));
        let patron = ledger.add_patron(Patron::new("Alice", "p1", "a@x.com"));
        let _ = ledger.handle_transaction(Loan::new(book, patron)).unwrap();

        let snapshot = ledger.to_snapshot();
        assert_eq!(snapshot.transactions.len(), 1);
        assert_eq!(snapshot.transactions[0].due_date, "None");
        assert!(snapshot.transactions[0].patron.borrowed_books.is_empty());
    }
}
