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

//! The transaction ledger store.
//!
//! [`Ledger`] owns the primary id→entry arena, the three secondary indices
//! and the sequence counter behind generated identifiers. All mutation
//! funnels through it: appending entries, status transitions, the processing
//! API and reversals.
//!
//! The ledger never computes balances. The account layer performs the
//! balance mutation and hands the resulting before/after snapshots in; the
//! ledger only records them.
//!
//! # Invariants
//!
//! - Entry identifiers are unique for the lifetime of the store.
//! - The indices are at all times exactly the projection of the arena onto
//!   account, owner and date.
//! - The sequence counter always exceeds every numeric suffix present in
//!   the store, so generated identifiers stay monotonic across restarts.

use crate::base::EntryId;
use crate::clock::{Clock, SystemClock};
use crate::entry::{EntryKind, EntryStatus, LedgerEntry};
use crate::error::LedgerError;
use crate::index::EntryIndex;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Transaction ledger: primary store, indices and the single-writer
/// mutation surface.
///
/// The ledger assumes exactly one logical writer; wrap it in
/// [`SharedLedger`](crate::SharedLedger) when sharing across threads.
pub struct Ledger {
    pub(crate) entries: BTreeMap<EntryId, LedgerEntry>,
    pub(crate) index: EntryIndex,
    pub(crate) next_sequence: u64,
    pub(crate) record_path: PathBuf,
    audit_path: PathBuf,
    pub(crate) clock: Box<dyn Clock>,
}

impl Ledger {
    /// Creates an empty ledger persisting to `record_path` and appending
    /// status transitions to the audit log at `audit_path`.
    pub fn new(record_path: impl Into<PathBuf>, audit_path: impl Into<PathBuf>) -> Self {
        Self::with_clock(record_path, audit_path, Box::new(SystemClock))
    }

    /// Creates an empty ledger with an explicit time source.
    pub fn with_clock(
        record_path: impl Into<PathBuf>,
        audit_path: impl Into<PathBuf>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            entries: BTreeMap::new(),
            index: EntryIndex::default(),
            next_sequence: 1,
            record_path: record_path.into(),
            audit_path: audit_path.into(),
            clock,
        }
    }

    /// Creates a ledger and loads any existing record file.
    ///
    /// A missing file yields an empty ledger, not an error.
    pub fn open(
        record_path: impl Into<PathBuf>,
        audit_path: impl Into<PathBuf>,
    ) -> Result<Self, LedgerError> {
        let mut ledger = Self::new(record_path, audit_path);
        ledger.load()?;
        Ok(ledger)
    }

    /// Allocates the next entry identifier: `TXN` + compact current date +
    /// zero-padded running counter.
    pub fn allocate_id(&mut self) -> EntryId {
        let id = EntryId::new(format!(
            "TXN{}{:03}",
            self.clock.date_compact(),
            self.next_sequence
        ));
        self.next_sequence += 1;
        id
    }

    /// Appends an entry, rejecting duplicate identifiers.
    ///
    /// On success the entry lands in the arena and all three indices, and
    /// the sequence counter advances past the entry's numeric suffix so a
    /// later allocation can never collide with it.
    pub fn append(&mut self, entry: LedgerEntry) -> Result<(), LedgerError> {
        if self.entries.contains_key(entry.id()) {
            return Err(LedgerError::DuplicateEntry(entry.id().clone()));
        }
        if let Some(sequence) = entry.id().sequence() {
            if sequence >= self.next_sequence {
                self.next_sequence = sequence + 1;
            }
        }
        self.index.insert(&entry);
        debug!(id = %entry.id(), kind = %entry.kind(), "entry appended");
        self.entries.insert(entry.id().clone(), entry);
        Ok(())
    }

    pub fn find(&self, id: &EntryId) -> Option<&LedgerEntry> {
        self.entries.get(id)
    }

    /// All entries, in identifier order.
    pub fn entries(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Changes an entry's status.
    ///
    /// Setting the status an entry already has is a silent no-op. An
    /// effective transition appends one line to the audit trail; a failure
    /// to write that line is reported but does not fail the transition.
    pub fn set_status(&mut self, id: &EntryId, status: EntryStatus) -> Result<(), LedgerError> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| LedgerError::EntryNotFound(id.clone()))?;
        let old = entry.status();
        if old == status {
            return Ok(());
        }
        entry.set_status(status);
        info!(%id, from = %old, to = %status, "status changed");
        let line = format!(
            "Transaction {} status changed from {} to {} at {}",
            id,
            old.ordinal(),
            status.ordinal(),
            self.clock.timestamp()
        );
        if let Err(error) = self.append_audit(&line) {
            warn!(%id, %error, "audit trail write failed");
        }
        Ok(())
    }

    /// Replaces the free-text notes on an entry.
    pub fn set_notes(
        &mut self,
        id: &EntryId,
        notes: impl Into<String>,
    ) -> Result<(), LedgerError> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| LedgerError::EntryNotFound(id.clone()))?;
        entry.set_notes(notes);
        Ok(())
    }

    /// Tags an entry with the session it was recorded under.
    pub fn set_session_id(
        &mut self,
        id: &EntryId,
        session_id: impl Into<String>,
    ) -> Result<(), LedgerError> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| LedgerError::EntryNotFound(id.clone()))?;
        entry.set_session_id(session_id);
        Ok(())
    }

    /// Updates the stored balance-after snapshot. Negative balances are
    /// rejected without mutation.
    pub fn set_balance_after(
        &mut self,
        id: &EntryId,
        balance: Decimal,
    ) -> Result<(), LedgerError> {
        if balance < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| LedgerError::EntryNotFound(id.clone()))?;
        entry.set_balance_after(balance);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Processing API
    // ------------------------------------------------------------------

    /// Records a completed deposit and returns its identifier.
    pub fn record_deposit(
        &mut self,
        account: &str,
        amount: Decimal,
        description: &str,
        balance_before: Decimal,
        balance_after: Decimal,
        owner: &str,
    ) -> Result<EntryId, LedgerError> {
        self.record_single(
            account,
            EntryKind::Deposit,
            amount,
            description,
            balance_before,
            balance_after,
            owner,
        )
    }

    /// Records a completed withdrawal and returns its identifier.
    pub fn record_withdrawal(
        &mut self,
        account: &str,
        amount: Decimal,
        description: &str,
        balance_before: Decimal,
        balance_after: Decimal,
        owner: &str,
    ) -> Result<EntryId, LedgerError> {
        self.record_single(
            account,
            EntryKind::Withdrawal,
            amount,
            description,
            balance_before,
            balance_after,
            owner,
        )
    }

    /// Records a completed fee charge and returns its identifier.
    pub fn record_fee_charge(
        &mut self,
        account: &str,
        amount: Decimal,
        description: &str,
        balance_before: Decimal,
        balance_after: Decimal,
        owner: &str,
    ) -> Result<EntryId, LedgerError> {
        self.record_single(
            account,
            EntryKind::FeeCharge,
            amount,
            description,
            balance_before,
            balance_after,
            owner,
        )
    }

    /// Records a completed interest credit and returns its identifier.
    pub fn record_interest_credit(
        &mut self,
        account: &str,
        amount: Decimal,
        description: &str,
        balance_before: Decimal,
        balance_after: Decimal,
        owner: &str,
    ) -> Result<EntryId, LedgerError> {
        self.record_single(
            account,
            EntryKind::InterestCredit,
            amount,
            description,
            balance_before,
            balance_after,
            owner,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn record_single(
        &mut self,
        account: &str,
        kind: EntryKind,
        amount: Decimal,
        description: &str,
        balance_before: Decimal,
        balance_after: Decimal,
        owner: &str,
    ) -> Result<EntryId, LedgerError> {
        Self::validate(account, amount)?;
        let id = self.allocate_id();
        let entry = LedgerEntry::new(
            id.clone(),
            account,
            kind,
            amount,
            description,
            balance_before,
            balance_after,
            owner,
            self.clock.timestamp(),
        );
        self.append(entry)?;
        info!(%id, kind = %kind, account, %amount, "entry recorded");
        Ok(id)
    }

    /// Records the two legs of a transfer and returns the outbound leg's
    /// identifier; the inbound leg is discoverable through its
    /// `related_account`.
    ///
    /// The outbound leg commits first. If the inbound leg cannot be
    /// appended, the outbound leg is retained and marked `Failed` rather
    /// than deleted — the ledger keeps a record of the attempted transfer —
    /// and the operation reports [`LedgerError::TransferLegFailed`]. This is
    /// a best-effort compensating action, not a transaction: between the two
    /// appends the store briefly holds a half-open transfer.
    #[allow(clippy::too_many_arguments)]
    pub fn record_transfer(
        &mut self,
        from_account: &str,
        to_account: &str,
        amount: Decimal,
        description: &str,
        from_before: Decimal,
        from_after: Decimal,
        to_before: Decimal,
        to_after: Decimal,
        owner: &str,
    ) -> Result<EntryId, LedgerError> {
        Self::validate(from_account, amount)?;
        Self::validate(to_account, amount)?;

        let out_id = self.allocate_id();
        let mut out_leg = LedgerEntry::new(
            out_id.clone(),
            from_account,
            EntryKind::TransferOut,
            amount,
            description,
            from_before,
            from_after,
            owner,
            self.clock.timestamp(),
        );
        out_leg.set_related_account(to_account);
        self.append(out_leg)?;

        let in_id = self.allocate_id();
        let mut in_leg = LedgerEntry::new(
            in_id.clone(),
            to_account,
            EntryKind::TransferIn,
            amount,
            description,
            to_before,
            to_after,
            owner,
            self.clock.timestamp(),
        );
        in_leg.set_related_account(from_account);
        if let Err(error) = self.append(in_leg) {
            warn!(%out_id, %error, "inbound leg rejected; marking outbound leg failed");
            self.set_status(&out_id, EntryStatus::Failed)?;
            return Err(LedgerError::TransferLegFailed { out_id });
        }

        info!(%out_id, %in_id, from = from_account, to = to_account, %amount, "transfer recorded");
        Ok(out_id)
    }

    /// Reverses a completed entry.
    ///
    /// The target must be `Completed` and of a reversible kind (deposit,
    /// withdrawal or transfer leg); both guards run before any mutation. On
    /// success the original is marked `Reversed` with a note carrying the
    /// reason, and a compensating entry is recorded: a withdrawal for a
    /// deposit (and vice versa), or, for a transfer leg, a compensating
    /// transfer whose inverted balance snapshots return the amount. A
    /// transfer reversal succeeds only if the compensating transfer itself
    /// succeeded.
    pub fn reverse(&mut self, id: &EntryId, reason: &str) -> Result<(), LedgerError> {
        let entry = self
            .entries
            .get(id)
            .ok_or_else(|| LedgerError::EntryNotFound(id.clone()))?;
        if entry.status() != EntryStatus::Completed {
            return Err(LedgerError::NotReversible {
                id: id.clone(),
                status: entry.status(),
            });
        }
        let compensating_kind = match entry.kind() {
            EntryKind::Deposit => Some(EntryKind::Withdrawal),
            EntryKind::Withdrawal => Some(EntryKind::Deposit),
            EntryKind::TransferIn | EntryKind::TransferOut => None,
            kind => {
                return Err(LedgerError::UnsupportedReversal {
                    id: id.clone(),
                    kind,
                });
            }
        };

        let original = entry.clone();
        self.set_status(id, EntryStatus::Reversed)?;
        self.set_notes(id, format!("Reversed: {reason}"))?;

        match compensating_kind {
            Some(kind) => {
                let reversal_id = self.allocate_id();
                let mut compensating = LedgerEntry::new(
                    reversal_id.clone(),
                    original.account(),
                    kind,
                    original.amount(),
                    format!("Reversal of {}", original.id()),
                    original.balance_before(),
                    original.balance_after(),
                    original.owner_raw(),
                    self.clock.timestamp(),
                );
                compensating.set_related_account(original.related_account_raw());
                self.append(compensating)?;
                info!(%id, reversal = %reversal_id, "entry reversed");
            }
            None => {
                // Compensating transfer between the same pair of accounts;
                // the inverted balance snapshots carry the amount back.
                let amount = original.amount();
                let from_before = original.balance_before();
                let to_before = original.balance_after();
                let reversal_id = self.record_transfer(
                    original.account(),
                    original.related_account_raw(),
                    amount,
                    &format!("Reversal of transfer {}", original.id()),
                    from_before,
                    from_before + amount,
                    to_before,
                    to_before - amount,
                    original.owner_raw(),
                )?;
                info!(%id, reversal = %reversal_id, "transfer reversed");
            }
        }
        Ok(())
    }

    fn validate(account: &str, amount: Decimal) -> Result<(), LedgerError> {
        if account.is_empty() {
            return Err(LedgerError::MissingAccount);
        }
        if amount < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        Ok(())
    }

    fn append_audit(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.audit_path)?;
        writeln!(file, "{line}")
    }
}
