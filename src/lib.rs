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

//! # Circulation Ledger
//!
//! This library tracks a library's circulating inventory: catalog entries,
//! registered borrowers, and the loans that bind them.
//!
//! ## Core Components
//!
//! - [`Ledger`]: System of record owning books, patrons and the transaction log
//! - [`Book`]: Catalog entry with its available-copy count
//! - [`Patron`]: Borrower with the copies currently checked out to it
//! - [`Loan`]: Checkout/return transaction between one book and one patron
//! - [`LedgerError`] / [`SnapshotError`]: Caller misuse and persistence failures
//!
//! ## Example
//!
//! ```
//! use circulation_ledger::{Book, Ledger, Loan, Patron};
//!
//! let mut ledger = Ledger::new();
//! let book = ledger.add_book(Book::new("Dune", "Herbert", "111", 2));
//! let patron = ledger.add_patron(Patron::new("Alice", "p1", "a@x.com"));
//!
//! let (loan, outcome) = ledger.handle_transaction(Loan::new(book, patron)).unwrap();
//! assert!(outcome.is_applied());
//! assert_eq!(ledger.book(book).unwrap().quantity(), 1);
//! assert!(ledger.loan(loan).unwrap().due_date().is_some());
//! ```
//!
//! ## Concurrency
//!
//! The ledger is a single-owner, synchronous structure. Callers needing
//! shared access must provide their own synchronization.

mod base;
pub mod book;
pub mod clock;
pub mod error;
mod ledger;
pub mod loan;
pub mod patron;
pub mod policy;
pub mod snapshot;

pub use base::{BookHandle, LoanHandle, PatronHandle};
pub use book::Book;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{LedgerError, SnapshotError};
pub use ledger::Ledger;
pub use loan::{Loan, LoanState, Outcome, Refusal};
pub use patron::Patron;
pub use policy::{CirculationPolicy, StandardPolicy};
pub use snapshot::{BookRecord, LoanRecord, PatronRecord, Snapshot};
