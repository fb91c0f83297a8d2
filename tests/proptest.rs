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

//! Property-based tests for the circulation ledger.
//!
//! These tests verify invariants that should hold for any sequence of
//! checkouts and returns.

use circulation_ledger::{Book, Ledger, Loan, LoanHandle, Patron};
use proptest::prelude::*;

// =============================================================================
// Arbitrary Strategies
// =============================================================================

#[derive(Debug, Clone)]
enum Op {
    /// Check the book out to the patron at this index.
    Checkout(usize),
    /// Return the loan at this index of the log (wrapped).
    Return(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..3).prop_map(Op::Checkout),
        (0usize..32).prop_map(Op::Return),
    ]
}

fn arb_title() -> impl Strategy<Value = String> {
    "[A-Za-z ]{1,16}"
}

// =============================================================================
// Stock Invariant Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// quantity == initial + successful returns - successful checkouts,
    /// and held copies account for the difference.
    #[test]
    fn stock_is_conserved(
        initial in 0u32..5,
        ops in prop::collection::vec(arb_op(), 0..40),
    ) {
        let mut ledger = Ledger::new();
        let book = ledger.add_book(Book::new("Dune", "Herbert", "111", initial));
        let patrons: Vec<_> = (0..3)
            .map(|i| ledger.add_patron(Patron::new(format!("P{i}"), format!("p{i}"), "")))
            .collect();

        let mut checkouts = 0u32;
        let mut returns = 0u32;
        let mut attempts = 0usize;

        for op in ops {
            match op {
                Op::Checkout(patron) => {
                    attempts += 1;
                    let (_, outcome) = ledger
                        .handle_transaction(Loan::new(book, patrons[patron]))
                        .unwrap();
                    if outcome.is_applied() {
                        checkouts += 1;
                    }
                }
                Op::Return(index) => {
                    let count = ledger.transactions().len();
                    if count == 0 {
                        continue;
                    }
                    let loan = LoanHandle((index % count) as u32);
                    if ledger.return_loan(loan).unwrap().is_applied() {
                        returns += 1;
                    }
                }
            }
        }

        let quantity = ledger.book(book).unwrap().quantity();
        prop_assert_eq!(quantity, initial + returns - checkouts);

        let held: usize = patrons
            .iter()
            .map(|patron| ledger.patron(*patron).unwrap().borrowed().len())
            .sum();
        prop_assert_eq!(held as u32, checkouts - returns);
        prop_assert_eq!(ledger.transactions().len(), attempts);
    }

    /// Checkouts never exceed the initial stock without intervening returns.
    #[test]
    fn checkouts_bounded_by_stock(
        initial in 0u32..10,
        attempts in 0usize..20,
    ) {
        let mut ledger = Ledger::new();
        let book = ledger.add_book(Book::new("Dune", "Herbert", "111", initial));
        let patron = ledger.add_patron(Patron::new("Alice", "p1", "a@x.com"));

        let applied = (0..attempts)
            .filter(|_| {
                let (_, outcome) = ledger.handle_transaction(Loan::new(book, patron)).unwrap();
                outcome.is_applied()
            })
            .count();

        prop_assert_eq!(applied, attempts.min(initial as usize));
        prop_assert_eq!(
            ledger.book(book).unwrap().quantity() as usize,
            initial as usize - applied
        );
    }
}

// =============================================================================
// Search and Persistence Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// An empty query returns the whole catalog in order, and every title is
    /// found by its own upper-cased text.
    #[test]
    fn search_matches_catalog(
        titles in prop::collection::vec(arb_title(), 0..12),
    ) {
        let mut ledger = Ledger::new();
        for title in &titles {
            ledger.add_book(Book::new(title.as_str(), "x", "0", 1));
        }

        prop_assert_eq!(ledger.search_by_title(""), ledger.catalog().to_vec());
        for (handle, book) in ledger.books() {
            let hits = ledger.search_by_title(&book.title().to_uppercase());
            prop_assert!(hits.contains(&handle));
        }
    }

    /// Serializing a reloaded ledger reproduces the original document.
    #[test]
    fn snapshot_round_trip_is_stable(
        titles in prop::collection::vec(arb_title(), 1..6),
        checkouts in prop::collection::vec(0usize..6, 0..10),
    ) {
        let mut ledger = Ledger::new();
        let books: Vec<_> = titles
            .iter()
            .map(|title| ledger.add_book(Book::new(title.as_str(), "x", "0", 2)))
            .collect();
        let patron = ledger.add_patron(Patron::new("Alice", "p1", "a@x.com"));
        for index in checkouts {
            let book = books[index % books.len()];
            let _ = ledger.handle_transaction(Loan::new(book, patron)).unwrap();
        }

        let json = ledger.serialize().unwrap();
        let reloaded = Ledger::deserialize(&json).unwrap();
        prop_assert_eq!(reloaded.serialize().unwrap(), json);
    }
}
