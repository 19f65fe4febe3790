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

//! Error types for ledger operations.

use crate::base::EntryId;
use crate::entry::{EntryKind, EntryStatus};
use thiserror::Error;

/// Ledger operation errors.
///
/// Nothing here is fatal to the process: validation failures reject before
/// any mutation, a partial transfer retains its Failed first leg, and a
/// missing record file on load means "start empty".
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Amount is negative
    #[error("invalid amount (must be non-negative)")]
    InvalidAmount,

    /// A required account identifier was empty
    #[error("account identifier must not be empty")]
    MissingAccount,

    /// An entry with this ID already exists in the store
    #[error("duplicate entry ID {0}")]
    DuplicateEntry(EntryId),

    /// Referenced entry ID does not exist
    #[error("entry {0} not found")]
    EntryNotFound(EntryId),

    /// Reversal attempted on an entry that is not Completed
    #[error("entry {id} cannot be reversed from status {status}")]
    NotReversible { id: EntryId, status: EntryStatus },

    /// Entry kind has no reversal rule
    #[error("reversal is not supported for {kind} entries ({id})")]
    UnsupportedReversal { id: EntryId, kind: EntryKind },

    /// Second transfer leg could not be appended; the first leg is retained
    /// and marked Failed
    #[error("transfer leg could not be recorded; outbound leg {out_id} marked failed")]
    TransferLegFailed { out_id: EntryId },

    /// Record file line could not be parsed
    #[error("malformed record at line {line}: {reason}")]
    CorruptRecord { line: usize, reason: String },

    /// CSV export failure
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    /// Underlying file I/O failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
