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

//! # txn-ledger
//!
//! A transaction ledger engine: every monetary movement is recorded as an
//! immutable-by-default entry with a globally unique identifier, indexed for
//! retrieval by account, owner and date, guarded by a constrained
//! reversal/status state machine, and persisted to a flat record store.
//!
//! The ledger never computes balances. The account layer performs the
//! balance mutation, then hands the resulting before/after snapshots and a
//! classification to the processing API; the ledger allocates an identifier,
//! builds the entry, inserts it into the store and all three indices, and
//! returns the identifier.
//!
//! ## Core Components
//!
//! - [`Ledger`]: primary store, sequence allocator and mutation surface
//! - [`LedgerEntry`]: one recorded monetary event
//! - [`EntryKind`] / [`EntryStatus`]: classification and lifecycle
//! - [`SharedLedger`]: lock-guarded handle for concurrent callers
//! - [`LedgerError`]: failure modes of every fallible operation
//!
//! ## Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use txn_ledger::Ledger;
//!
//! let dir = std::env::temp_dir();
//! let mut ledger = Ledger::new(dir.join("doc-records.log"), dir.join("doc-audit.log"));
//!
//! let id = ledger
//!     .record_deposit(
//!         "SAV001",
//!         dec!(200.00),
//!         "Initial deposit",
//!         dec!(1000.00),
//!         dec!(1200.00),
//!         "CUST001",
//!     )
//!     .unwrap();
//!
//! let entry = ledger.find(&id).unwrap();
//! assert_eq!(entry.amount(), dec!(200.00));
//! assert_eq!(ledger.total_deposits("SAV001", "", ""), dec!(200.00));
//! ```
//!
//! ## Thread Safety
//!
//! [`Ledger`] assumes exactly one logical writer and performs no internal
//! locking. Wrap it in [`SharedLedger`] to share across threads: every
//! operation then runs as one critical section, which matters because the
//! two-leg transfer is not atomic.

pub mod base;
pub mod clock;
pub mod entry;
pub mod error;
mod index;
mod ledger;
mod persist;
mod query;
mod shared;

pub use base::EntryId;
pub use clock::{Clock, FixedClock, SystemClock};
pub use entry::{EntryKind, EntryStatus, LedgerEntry};
pub use error::LedgerError;
pub use ledger::Ledger;
pub use query::{KindTotal, LedgerStats};
pub use shared::SharedLedger;
