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

//! Loans and their checkout/return logic.
//!
//! A loan moves through three states, none of which is stored on the loan:
//!
//! ```text
//!  Unsettled ──checkout──► Active ──return──► Closed
//!  (no due date)           (due date set,     (copy back on shelf,
//!                           copy taken)        handle released)
//! ```
//!
//! A refused checkout leaves the loan `Unsettled` forever. Returning does not
//! clear the due date, so [`Loan::state`] infers `Active` versus `Closed` from
//! the borrower's held copies.

use crate::base::{BookHandle, PatronHandle};
use crate::book::Book;
use crate::ledger::Ledger;
use crate::patron::Patron;
use crate::policy::CirculationPolicy;
use chrono::NaiveDateTime;
use std::fmt;

/// Why an operation did not apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    /// Checkout on an entry with no copies left
    OutOfStock,
    /// Return of an entry the borrower does not hold
    NotBorrowed,
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfStock => write!(f, "Sorry, the book is out of stock."),
            Self::NotBorrowed => write!(f, "This book was not borrowed by the patron."),
        }
    }
}

/// Result of a checkout or return. Refusals are expected and carry no error.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Refused(Refusal),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    pub fn refusal(&self) -> Option<Refusal> {
        match self {
            Self::Applied => None,
            Self::Refused(refusal) => Some(*refusal),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanState {
    Unsettled,
    Active,
    Closed,
}

/// A transaction binding one catalog entry to one borrower.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    book: BookHandle,
    patron: PatronHandle,
    due_date: Option<NaiveDateTime>,
}

impl Loan {
    pub fn new(book: BookHandle, patron: PatronHandle) -> Self {
        Self {
            book,
            patron,
            due_date: None,
        }
    }

    pub(crate) fn restored(
        book: BookHandle,
        patron: PatronHandle,
        due_date: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            book,
            patron,
            due_date,
        }
    }

    pub fn book(&self) -> BookHandle {
        self.book
    }

    pub fn patron(&self) -> PatronHandle {
        self.patron
    }

    /// Set once a checkout succeeds.
    pub fn due_date(&self) -> Option<NaiveDateTime> {
        self.due_date
    }

    /// Takes a copy of `book` and hands it to `patron`, due one loan period
    /// after `now`. Refused when no copy is left; nothing changes then.
    ///
    /// `book` and `patron` must be the entities this loan's handles name.
    pub fn checkout(
        &mut self,
        book: &mut Book,
        patron: &mut Patron,
        now: NaiveDateTime,
        policy: &dyn CirculationPolicy,
    ) -> Outcome {
        if !book.take_copy() {
            let refusal = Refusal::OutOfStock;
            tracing::warn!(book = %self.book, patron = %self.patron, "{refusal}");
            return Outcome::Refused(refusal);
        }
        patron.borrow(self.book);
        let due_date = now + policy.loan_period();
        self.due_date = Some(due_date);
        tracing::debug!(book = %self.book, patron = %self.patron, %due_date, "checked out");
        Outcome::Applied
    }

    /// Puts the copy back on the shelf and releases one held handle.
    /// Refused when `patron` does not hold the book; nothing changes then.
    pub fn return_book(&self, book: &mut Book, patron: &mut Patron) -> Outcome {
        if !patron.holds(self.book) {
            let refusal = Refusal::NotBorrowed;
            tracing::warn!(book = %self.book, patron = %self.patron, "{refusal}");
            return Outcome::Refused(refusal);
        }
        book.put_back_copy();
        patron.return_item(self.book);
        tracing::debug!(book = %self.book, patron = %self.patron, "returned");
        Outcome::Applied
    }

    /// Delegates to the policy's fine rule. Produces no result.
    pub fn calculate_fine(&self, policy: &dyn CirculationPolicy) {
        policy.calculate_fine(self);
    }

    /// Infers the loan's state from the ledger.
    ///
    /// When a borrower holds the same entry through several loans, every
    /// such loan with a due date reads as `Active` until all copies are back.
    pub fn state(&self, ledger: &Ledger) -> LoanState {
        if self.due_date.is_none() {
            return LoanState::Unsettled;
        }
        let held = ledger
            .patron(self.patron)
            .is_some_and(|patron| patron.holds(self.book));
        if held {
            LoanState::Active
        } else {
            LoanState::Closed
        }
    }
}
