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

//! Registered borrowers.
//!
//! A [`Patron`] holds handles to the copies currently checked out to it.
//! The handles point at entries owned by the [`Ledger`], so stock changes
//! are visible through them. This layer trusts its caller: `borrow` does
//! no stock or duplicate checks.

use crate::base::BookHandle;
use crate::ledger::Ledger;
use crate::snapshot::PatronRecord;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patron {
    name: String,
    id: String,
    contact_info: String,
    /// Held copies in borrow order; the same handle may appear more than once.
    borrowed: Vec<BookHandle>,
}

impl Patron {
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        contact_info: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            contact_info: contact_info.into(),
            borrowed: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn contact_info(&self) -> &str {
        &self.contact_info
    }

    pub fn borrowed(&self) -> &[BookHandle] {
        &self.borrowed
    }

    pub fn holds(&self, book: BookHandle) -> bool {
        self.borrowed.contains(&book)
    }

    /// Appends `book` to the held copies.
    pub fn borrow(&mut self, book: BookHandle) {
        self.borrowed.push(book);
    }

    /// Removes the first occurrence of `book`. Does nothing if it is not held.
    pub fn return_item(&mut self, book: BookHandle) {
        if let Some(position) = self.borrowed.iter().position(|held| *held == book) {
            self.borrowed.remove(position);
        }
    }

    /// Builds the persisted form, embedding a full record for every held copy.
    pub fn to_record(&self, ledger: &Ledger) -> PatronRecord {
        PatronRecord {
            name: self.name.clone(),
            id: self.id.clone(),
            contact_info: self.contact_info.clone(),
            borrowed_books: self
                .borrowed
                .iter()
                .filter_map(|handle| ledger.book(*handle))
                .map(|book| book.to_record())
                .collect(),
        }
    }
}

impl fmt::Display for Patron {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "ID: {}", self.id)?;
        write!(f, "Contact Information: {}", self.contact_info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borrow_appends_duplicates() {
        let mut patron = Patron::new("Alice", "p1", "a@x.com");
        patron.borrow(BookHandle(0));
        patron.borrow(BookHandle(0));
        patron.borrow(BookHandle(2));
        assert_eq!(
            patron.borrowed(),
            &[BookHandle(0), BookHandle(0), BookHandle(2)]
        );
    }

    #[test]
    fn return_item_removes_first_match_only() {
        let mut patron = Patron::new("Alice", "p1", "a@x.com");
        patron.borrow(BookHandle(1));
        patron.borrow(BookHandle(0));
        patron.borrow(BookHandle(1));

        patron.return_item(BookHandle(1));
        assert_eq!(patron.borrowed(), &[BookHandle(0), BookHandle(1)]);
    }

    #[test]
    fn return_item_absent_is_noop() {
        let mut patron = Patron::new("Alice", "p1", "a@x.com");
        patron.borrow(BookHandle(0));
        patron.return_item(BookHandle(9));
        assert_eq!(patron.borrowed(), &[BookHandle(0)]);
    }

    #[test]
    fn display_lists_details_in_order() {
        let patron = Patron::new("Alice", "p1", "a@x.com");
        assert_eq!(
            patron.to_string(),
            "Name: Alice\nID: p1\nContact Information: a@x.com"
        );
    }
}
