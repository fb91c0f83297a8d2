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

//! Circulation policy.
//!
//! The loan period is the only rule with behavior today. Fines and reports
//! are extension points: the default implementations do nothing, so callers
//! can invoke them unconditionally.

use crate::ledger::Ledger;
use crate::loan::Loan;
use chrono::TimeDelta;

/// Default loan period in days.
pub const DEFAULT_LOAN_DAYS: i64 = 14;

pub trait CirculationPolicy {
    /// Time between a successful checkout and the loan's due date.
    fn loan_period(&self) -> TimeDelta {
        TimeDelta::days(DEFAULT_LOAN_DAYS)
    }

    /// Assesses a fine for `loan`. No fines are charged by default.
    fn calculate_fine(&self, _loan: &Loan) {}

    /// Produces reports over the ledger. Nothing is generated by default.
    fn generate_reports(&self, _ledger: &Ledger) {}
}

/// Fourteen-day loans, no fines, no reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPolicy;

impl CirculationPolicy for StandardPolicy {}
