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

//! Ledger entries: the record of one monetary event.
//!
//! The identifying core of an entry (id, account, kind, amount, timestamp,
//! balance snapshots) is immutable after construction. Status and the
//! annotation tail (notes, session, related account) form the small mutable
//! surface, changed only through the owning [`Ledger`](crate::Ledger).

use crate::base::EntryId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a monetary event. Set once at construction.
///
/// The discriminant order is stable: ordinals are the persisted form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntryKind {
    Deposit,
    Withdrawal,
    TransferIn,
    TransferOut,
    FeeCharge,
    InterestCredit,
    AccountOpening,
    AccountClosing,
    Unknown,
}

impl EntryKind {
    /// Stable ordinal used in the record file and CSV export.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Some(match ordinal {
            0 => Self::Deposit,
            1 => Self::Withdrawal,
            2 => Self::TransferIn,
            3 => Self::TransferOut,
            4 => Self::FeeCharge,
            5 => Self::InterestCredit,
            6 => Self::AccountOpening,
            7 => Self::AccountClosing,
            8 => Self::Unknown,
            _ => return None,
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Withdrawal => "WITHDRAWAL",
            Self::TransferIn => "TRANSFER_IN",
            Self::TransferOut => "TRANSFER_OUT",
            Self::FeeCharge => "FEE_CHARGE",
            Self::InterestCredit => "INTEREST_CREDIT",
            Self::AccountOpening => "ACCOUNT_OPENING",
            Self::AccountClosing => "ACCOUNT_CLOSING",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle status of an entry.
///
/// Any status may overwrite any other; only reversal carries a guard
/// (the target must be Completed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntryStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
    Reversed,
}

impl EntryStatus {
    /// Stable ordinal used in the record file and the audit trail.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Some(match ordinal {
            0 => Self::Pending,
            1 => Self::Completed,
            2 => Self::Failed,
            3 => Self::Cancelled,
            4 => Self::Reversed,
            _ => return None,
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Reversed => "REVERSED",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One recorded monetary event.
///
/// Free-text fields treat empty as a valid stored value distinct from
/// "unset"; the read accessors apply presentation defaults without changing
/// stored state. Persistence always writes the raw stored values.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    id: EntryId,
    account: String,
    related_account: String,
    kind: EntryKind,
    amount: Decimal,
    timestamp: String,
    description: String,
    balance_before: Decimal,
    balance_after: Decimal,
    status: EntryStatus,
    owner: String,
    session_id: String,
    notes: String,
}

impl LedgerEntry {
    /// Builds a `Completed` entry stamped with `timestamp`.
    ///
    /// The related account, session and notes start empty; transfers link
    /// their legs through [`Ledger`](crate::Ledger) after construction.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: EntryId,
        account: impl Into<String>,
        kind: EntryKind,
        amount: Decimal,
        description: impl Into<String>,
        balance_before: Decimal,
        balance_after: Decimal,
        owner: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id,
            account: account.into(),
            related_account: String::new(),
            kind,
            amount,
            timestamp: timestamp.into(),
            description: description.into(),
            balance_before,
            balance_after,
            status: EntryStatus::Completed,
            owner: owner.into(),
            session_id: String::new(),
            notes: String::new(),
        }
    }

    pub fn id(&self) -> &EntryId {
        &self.id
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// Related account for transfer legs, or `"N/A"` when unset.
    pub fn related_account(&self) -> &str {
        if self.related_account.is_empty() {
            "N/A"
        } else {
            &self.related_account
        }
    }

    /// Stored related account; empty when unset.
    pub fn related_account_raw(&self) -> &str {
        &self.related_account
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Date component of the timestamp (`YYYY-MM-DD`), the date index key.
    pub fn date(&self) -> &str {
        self.timestamp.get(..10).unwrap_or(&self.timestamp)
    }

    /// Description with the presentation default applied.
    pub fn description(&self) -> &str {
        if self.description.is_empty() {
            "No description provided"
        } else {
            &self.description
        }
    }

    pub fn description_raw(&self) -> &str {
        &self.description
    }

    pub fn balance_before(&self) -> Decimal {
        self.balance_before
    }

    /// Balance after the event.
    ///
    /// A stored value of exactly zero is read as "unset" and falls back to
    /// `balance_before + amount`. This mirrors the historical record format,
    /// which could not distinguish the two; the raw value is what gets
    /// persisted, so round-trips stay exact.
    pub fn balance_after(&self) -> Decimal {
        if self.balance_after == Decimal::ZERO {
            self.balance_before + self.amount
        } else {
            self.balance_after
        }
    }

    /// Stored balance-after snapshot, without the unset fallback.
    pub fn balance_after_raw(&self) -> Decimal {
        self.balance_after
    }

    pub fn status(&self) -> EntryStatus {
        self.status
    }

    /// Owner (customer) identifier, or `"N/A"` when unset.
    pub fn owner(&self) -> &str {
        if self.owner.is_empty() { "N/A" } else { &self.owner }
    }

    pub fn owner_raw(&self) -> &str {
        &self.owner
    }

    /// Session identifier, or `"N/A"` when unset.
    pub fn session_id(&self) -> &str {
        if self.session_id.is_empty() {
            "N/A"
        } else {
            &self.session_id
        }
    }

    pub fn session_id_raw(&self) -> &str {
        &self.session_id
    }

    /// Notes with the presentation default applied.
    pub fn notes(&self) -> &str {
        if self.notes.is_empty() {
            "No notes provided"
        } else {
            &self.notes
        }
    }

    pub fn notes_raw(&self) -> &str {
        &self.notes
    }

    pub fn is_successful(&self) -> bool {
        self.status == EntryStatus::Completed
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self.kind, EntryKind::TransferIn | EntryKind::TransferOut)
    }

    /// Signed net amount: positive for credits (deposits, inbound transfers,
    /// interest), negative for debits (withdrawals, outbound transfers,
    /// fees), zero for kinds without a monetary direction.
    pub fn net_amount(&self) -> Decimal {
        match self.kind {
            EntryKind::Deposit | EntryKind::TransferIn | EntryKind::InterestCredit => self.amount,
            EntryKind::Withdrawal | EntryKind::TransferOut | EntryKind::FeeCharge => -self.amount,
            _ => Decimal::ZERO,
        }
    }

    pub(crate) fn set_status(&mut self, status: EntryStatus) {
        self.status = status;
    }

    pub(crate) fn set_related_account(&mut self, related: impl Into<String>) {
        self.related_account = related.into();
    }

    pub(crate) fn set_session_id(&mut self, session_id: impl Into<String>) {
        self.session_id = session_id.into();
    }

    pub(crate) fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub(crate) fn set_balance_after(&mut self, balance: Decimal) {
        self.balance_after = balance;
    }
}
