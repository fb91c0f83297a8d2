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

//! Handle types for entities owned by the [`Ledger`](crate::Ledger).
//!
//! Handles are indices into the ledger's arenas. Arena slots are never
//! freed, so a handle stays valid for as long as its ledger lives, and two
//! handles are equal exactly when they name the same entity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct BookHandle(pub u32);

impl fmt::Display for BookHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "book#{}", self.0)
    }
}

/// Handle to a registered borrower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PatronHandle(pub u32);

impl fmt::Display for PatronHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "patron#{}", self.0)
    }
}

/// Handle to a loan in the transaction log.
///
/// Loans are never removed from the log, so the handle doubles as the
/// loan's position in [`Ledger::transactions`](crate::Ledger::transactions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct LoanHandle(pub u32);

impl fmt::Display for LoanHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "loan#{}", self.0)
    }
}

macro_rules! impl_index {
    ($($handle:ident),*) => {
        $(
            impl $handle {
                /// Panics if the arena has outgrown the `u32` handle space.
                pub(crate) fn from_index(index: usize) -> Self {
                    Self(u32::try_from(index).expect("arena exceeds u32::MAX entries"))
                }

                pub(crate) fn index(self) -> usize {
                    self.0 as usize
                }
            }
        )*
    };
}

impl_index!(BookHandle, PatronHandle, LoanHandle);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_display_with_kind_prefix() {
        assert_eq!(BookHandle(3).to_string(), "book#3");
        assert_eq!(PatronHandle(0).to_string(), "patron#0");
        assert_eq!(LoanHandle(12).to_string(), "loan#12");
    }

    #[test]
    fn handle_index_round_trips() {
        let handle = BookHandle::from_index(7);
        assert_eq!(handle, BookHandle(7));
        assert_eq!(handle.index(), 7);
    }

    #[test]
    fn largest_index_maps_to_largest_handle() {
        assert_eq!(LoanHandle::from_index(u32::MAX as usize), LoanHandle(u32::MAX));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    #[should_panic(expected = "arena exceeds u32::MAX entries")]
    fn index_past_handle_space_panics() {
        let _ = BookHandle::from_index(u32::MAX as usize + 1);
    }
}
