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

//! Entry identifier type and its textual format.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a ledger entry.
///
/// Generated identifiers follow the format `TXN` + 8-digit compact date +
/// zero-padded 3-digit sequence number, e.g. `TXN20250122007`. The sequence
/// widens past three digits once the counter exceeds 999.
///
/// Identifiers are globally unique across the store and immutable once an
/// entry is created. Account and owner identifiers, by contrast, are opaque
/// text and stay plain strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric suffix following the `TXN` prefix and date component.
    ///
    /// This is what the store's sequence counter is recovered from; returns
    /// `None` when the identifier is not in the generated format.
    pub fn sequence(&self) -> Option<u64> {
        let rest = self.0.strip_prefix("TXN")?;
        let (date, sequence) = rest.split_at_checked(8)?;
        if !date.bytes().all(|b| b.is_ascii_digit()) || sequence.is_empty() {
            return None;
        }
        sequence.parse().ok()
    }

    /// Whether the identifier matches the generated format: `TXN`, eight
    /// date digits, then at least three sequence digits.
    pub fn is_valid(&self) -> bool {
        self.0.len() >= 14 && self.sequence().is_some()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntryId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for EntryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
