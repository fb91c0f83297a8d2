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

//! Circulation ledger.
//!
//! The [`Ledger`] is the system of record: it owns every catalog entry,
//! borrower and loan, and exposes search, add/remove and transaction
//! handling on top of them.
//!
//! # Ownership
//!
//! Entities live in append-only arenas and are addressed by handles. The
//! catalog and registry are ordered views over those arenas, so removing a
//! book from the catalog does not invalidate handles that borrowers or loans
//! still hold. Every handle names one entity; a quantity change made through
//! any path is visible through all of them.
//!
//! # Error Policy
//!
//! - Refusals (no stock, item not held) come back as [`Outcome::Refused`].
//! - Removing something that is not present, or passing a handle this ledger
//!   never issued, is a [`LedgerError`].

use crate::base::{BookHandle, LoanHandle, PatronHandle};
use crate::book::Book;
use crate::clock::{Clock, SystemClock};
use crate::error::LedgerError;
use crate::loan::{Loan, Outcome};
use crate::patron::Patron;
use crate::policy::{CirculationPolicy, StandardPolicy};
use std::fmt;

/// Owner of the catalog, the patron registry and the transaction log.
///
/// # Invariants
///
/// - A checkout never drives a book's quantity below zero.
/// - The transaction log only grows; returns do not remove loans.
/// - Catalog and registry keep insertion order and do not enforce uniqueness.
pub struct Ledger {
    /// Every book ever added or restored, cataloged or not.
    books: Vec<Book>,
    /// Every patron ever added or restored, registered or not.
    patrons: Vec<Patron>,
    /// Transaction log, in the order loans were handled.
    loans: Vec<Loan>,
    catalog: Vec<BookHandle>,
    registry: Vec<PatronHandle>,
    clock: Box<dyn Clock>,
    policy: Box<dyn CirculationPolicy>,
}

impl Ledger {
    /// Creates an empty ledger on the system clock with the standard policy.
    pub fn new() -> Self {
        Ledger {
            books: Vec::new(),
            patrons: Vec::new(),
            loans: Vec::new(),
            catalog: Vec::new(),
            registry: Vec::new(),
            clock: Box::new(SystemClock),
            policy: Box::new(StandardPolicy),
        }
    }

    /// Replaces the time source used for due dates.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replaces the loan period, fine and report rules.
    pub fn with_policy(mut self, policy: impl CirculationPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Returns handles of cataloged books whose title contains `query`,
    /// ignoring case, in catalog order. An empty query matches every book.
    pub fn search_by_title(&self, query: &str) -> Vec<BookHandle> {
        let query = query.to_lowercase();
        self.books()
            .filter(|(_, book)| book.title().to_lowercase().contains(&query))
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Appends `book` to the catalog.
    pub fn add_book(&mut self, book: Book) -> BookHandle {
        let handle = self.push_book(book);
        self.catalog.push(handle);
        tracing::debug!(book = %handle, "added book");
        handle
    }

    /// Removes `book` from the catalog.
    ///
    /// Borrowers and loans that reference it keep doing so.
    ///
    /// # Errors
    ///
    /// [`LedgerError::BookNotFound`] if `book` is not in the catalog.
    pub fn remove_book(&mut self, book: BookHandle) -> Result<(), LedgerError> {
        let position = self
            .catalog
            .iter()
            .position(|handle| *handle == book)
            .ok_or(LedgerError::BookNotFound(book))?;
        self.catalog.remove(position);
        tracing::debug!(%book, "removed book");
        Ok(())
    }

    /// Appends `patron` to the registry.
    pub fn add_patron(&mut self, patron: Patron) -> PatronHandle {
        let handle = self.push_patron(patron);
        self.registry.push(handle);
        tracing::debug!(patron = %handle, "added patron");
        handle
    }

    /// Removes `patron` from the registry.
    ///
    /// # Errors
    ///
    /// [`LedgerError::PatronNotFound`] if `patron` is not registered.
    pub fn remove_patron(&mut self, patron: PatronHandle) -> Result<(), LedgerError> {
        let position = self
            .registry
            .iter()
            .position(|handle| *handle == patron)
            .ok_or(LedgerError::PatronNotFound(patron))?;
        self.registry.remove(position);
        tracing::debug!(%patron, "removed patron");
        Ok(())
    }

    /// Logs `loan` and then attempts its checkout.
    ///
    /// The loan is appended before checkout runs, so a refused checkout still
    /// appears in the log (as an `Unsettled` loan with no due date).
    ///
    /// # Errors
    ///
    /// [`LedgerError::BookNotFound`] or [`LedgerError::PatronNotFound`] if the
    /// loan names an entity this ledger never issued. Nothing is logged then.
    pub fn handle_transaction(
        &mut self,
        loan: Loan,
    ) -> Result<(LoanHandle, Outcome), LedgerError> {
        let book = self
            .books
            .get_mut(loan.book().index())
            .ok_or(LedgerError::BookNotFound(loan.book()))?;
        let patron = self
            .patrons
            .get_mut(loan.patron().index())
            .ok_or(LedgerError::PatronNotFound(loan.patron()))?;

        let handle = LoanHandle::from_index(self.loans.len());
        self.loans.push(loan);
        tracing::debug!(loan = %handle, "logged transaction");

        let loan = &mut self.loans[handle.index()];
        let outcome = loan.checkout(book, patron, self.clock.now(), self.policy.as_ref());
        Ok((handle, outcome))
    }

    /// Processes the return for a logged loan. The loan stays in the log.
    ///
    /// # Errors
    ///
    /// [`LedgerError::LoanNotFound`] if `loan` is not in the log.
    pub fn return_loan(&mut self, loan: LoanHandle) -> Result<Outcome, LedgerError> {
        let entry = self
            .loans
            .get(loan.index())
            .ok_or(LedgerError::LoanNotFound(loan))?;
        let book = self
            .books
            .get_mut(entry.book().index())
            .ok_or(LedgerError::BookNotFound(entry.book()))?;
        let patron = self
            .patrons
            .get_mut(entry.patron().index())
            .ok_or(LedgerError::PatronNotFound(entry.patron()))?;
        Ok(entry.return_book(book, patron))
    }

    /// Runs the policy's fine rule for a logged loan.
    ///
    /// # Errors
    ///
    /// [`LedgerError::LoanNotFound`] if `loan` is not in the log.
    pub fn calculate_fine(&self, loan: LoanHandle) -> Result<(), LedgerError> {
        let entry = self.loan(loan).ok_or(LedgerError::LoanNotFound(loan))?;
        entry.calculate_fine(self.policy.as_ref());
        Ok(())
    }

    /// Runs the policy's report generation.
    pub fn generate_reports(&self) {
        self.policy.generate_reports(self);
    }

    /// Formats every cataloged book as a paragraph, each followed by a blank line.
    pub fn list_books_as_text(&self) -> String {
        self.books().map(|(_, book)| format!("{book}\n\n")).collect()
    }

    /// Resolves a book handle, whether or not the book is still cataloged.
    pub fn book(&self, book: BookHandle) -> Option<&Book> {
        self.books.get(book.index())
    }

    /// Mutable access for quantity corrections.
    pub fn book_mut(&mut self, book: BookHandle) -> Option<&mut Book> {
        self.books.get_mut(book.index())
    }

    /// Resolves a patron handle, whether or not the patron is still registered.
    pub fn patron(&self, patron: PatronHandle) -> Option<&Patron> {
        self.patrons.get(patron.index())
    }

    pub fn loan(&self, loan: LoanHandle) -> Option<&Loan> {
        self.loans.get(loan.index())
    }

    /// Cataloged books in catalog order.
    pub fn books(&self) -> impl Iterator<Item = (BookHandle, &Book)> {
        self.catalog
            .iter()
            .filter_map(|handle| self.book(*handle).map(|book| (*handle, book)))
    }

    /// Registered patrons in registry order.
    pub fn patrons(&self) -> impl Iterator<Item = (PatronHandle, &Patron)> {
        self.registry
            .iter()
            .filter_map(|handle| self.patron(*handle).map(|patron| (*handle, patron)))
    }

    /// The transaction log. A loan's position is its [`LoanHandle`].
    pub fn transactions(&self) -> &[Loan] {
        &self.loans
    }

    pub fn catalog(&self) -> &[BookHandle] {
        &self.catalog
    }

    pub fn registry(&self) -> &[PatronHandle] {
        &self.registry
    }

    pub fn is_cataloged(&self, book: BookHandle) -> bool {
        self.catalog.contains(&book)
    }

    pub fn is_registered(&self, patron: PatronHandle) -> bool {
        self.registry.contains(&patron)
    }

    /// First cataloged book with the given ISBN.
    pub fn find_book_by_isbn(&self, isbn: &str) -> Option<BookHandle> {
        self.books()
            .find(|(_, book)| book.isbn() == isbn)
            .map(|(handle, _)| handle)
    }

    /// First registered patron with the given identifier.
    pub fn find_patron_by_id(&self, id: &str) -> Option<PatronHandle> {
        self.patrons()
            .find(|(_, patron)| patron.id() == id)
            .map(|(handle, _)| handle)
    }

    /// Stores `book` without cataloging it.
    pub(crate) fn push_book(&mut self, book: Book) -> BookHandle {
        let handle = BookHandle::from_index(self.books.len());
        self.books.push(book);
        handle
    }

    /// Stores `patron` without registering it.
    pub(crate) fn push_patron(&mut self, patron: Patron) -> PatronHandle {
        let handle = PatronHandle::from_index(self.patrons.len());
        self.patrons.push(patron);
        handle
    }

    pub(crate) fn catalog_book(&mut self, book: BookHandle) {
        self.catalog.push(book);
    }

    pub(crate) fn register_patron(&mut self, patron: PatronHandle) {
        self.registry.push(patron);
    }

    /// Appends a loan to the log without running checkout.
    pub(crate) fn push_loan(&mut self, loan: Loan) -> LoanHandle {
        let handle = LoanHandle::from_index(self.loans.len());
        self.loans.push(loan);
        handle
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("books", &self.books)
            .field("patrons", &self.patrons)
            .field("loans", &self.loans)
            .field("catalog", &self.catalog)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
