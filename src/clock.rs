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

//! Time source abstraction.
//!
//! Timestamps are stored as fixed-width `YYYY-MM-DD HH:MM:SS` strings, so
//! lexicographic comparison equals chronological comparison. The clock is
//! trusted to be monotonic enough for that to hold.

use chrono::NaiveDateTime;

/// Source of the current date and time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    /// `YYYY-MM-DD HH:MM:SS`, the format stamped on every entry.
    fn timestamp(&self) -> String {
        self.now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// `YYYY-MM-DD`.
    fn date(&self) -> String {
        self.now().format("%Y-%m-%d").to_string()
    }

    /// `YYYYMMDD`, the date component of generated entry identifiers.
    fn date_compact(&self) -> String {
        self.now().format("%Y%m%d").to_string()
    }
}

/// Clock backed by the system's local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Clock pinned to a fixed instant, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
