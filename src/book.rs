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

//! Catalog entries.
//!
//! A [`Book`] is a plain value holder: a title record plus the number of
//! copies currently on the shelf. Stock bounds are enforced by
//! [`Loan`](crate::Loan), not here.
//!
//! # Example
//!
//! ```
//! use circulation_ledger::Book;
//!
//! let mut book = Book::new("Dune", "Herbert", "111", 2);
//! book.update_quantity(5);
//! assert_eq!(book.quantity(), 5);
//! ```

use crate::snapshot::BookRecord;
use std::fmt;

/// A title in the catalog with its available-copy count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    title: String,
    author: String,
    /// Intended to be unique; not enforced.
    isbn: String,
    quantity: u32,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            quantity,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    /// Copies currently available for checkout.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Overwrites the available-copy count.
    pub fn update_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    /// Takes one copy off the shelf. Returns `false` when none is left.
    pub(crate) fn take_copy(&mut self) -> bool {
        match self.quantity.checked_sub(1) {
            Some(remaining) => {
                self.quantity = remaining;
                true
            }
            None => false,
        }
    }

    pub(crate) fn put_back_copy(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }

    pub fn to_record(&self) -> BookRecord {
        BookRecord {
            title: self.title.clone(),
            author: self.author.clone(),
            isbn: self.isbn.clone(),
            quantity: self.quantity,
        }
    }
}

impl From<BookRecord> for Book {
    fn from(record: BookRecord) -> Self {
        Self {
            title: record.title,
            author: record.author,
            isbn: record.isbn,
            quantity: record.quantity,
        }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "Author: {}", self.author)?;
        writeln!(f, "ISBN: {}", self.isbn)?;
        write!(f, "Quantity: {}", self.quantity)
    }
}
