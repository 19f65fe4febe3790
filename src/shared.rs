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

//! A cloneable, lock-guarded handle for concurrent callers.
//!
//! The core [`Ledger`] assumes a single logical writer and its two-leg
//! transfer is not atomic: between the two appends the store briefly holds a
//! half-open transfer. `SharedLedger` serializes every operation — appends,
//! status updates, reversals, persistence and reads — behind one mutex, so
//! that window is never observable from another thread.

use crate::base::EntryId;
use crate::entry::EntryStatus;
use crate::error::LedgerError;
use crate::ledger::Ledger;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    pub fn record_deposit(
        &self,
        account: &str,
        amount: Decimal,
        description: &str,
        balance_before: Decimal,
        balance_after: Decimal,
        owner: &str,
    ) -> Result<EntryId, LedgerError> {
        self.inner
            .lock()
            .record_deposit(account, amount, description, balance_before, balance_after, owner)
    }

    pub fn record_withdrawal(
        &self,
        account: &str,
        amount: Decimal,
        description: &str,
        balance_before: Decimal,
        balance_after: Decimal,
        owner: &str,
    ) -> Result<EntryId, LedgerError> {
        self.inner.lock().record_withdrawal(
            account,
            amount,
            description,
            balance_before,
            balance_after,
            owner,
        )
    }

    pub fn record_fee_charge(
        &self,
        account: &str,
        amount: Decimal,
        description: &str,
        balance_before: Decimal,
        balance_after: Decimal,
        owner: &str,
    ) -> Result<EntryId, LedgerError> {
        self.inner.lock().record_fee_charge(
            account,
            amount,
            description,
            balance_before,
            balance_after,
            owner,
        )
    }

    pub fn record_interest_credit(
        &self,
        account: &str,
        amount: Decimal,
        description: &str,
        balance_before: Decimal,
        balance_after: Decimal,
        owner: &str,
    ) -> Result<EntryId, LedgerError> {
        self.inner.lock().record_interest_credit(
            account,
            amount,
            description,
            balance_before,
            balance_after,
            owner,
        )
    }

    /// Records both transfer legs under one lock acquisition; no reader can
    /// observe the half-open intermediate state.
    #[allow(clippy::too_many_arguments)]
    pub fn record_transfer(
        &self,
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
        self.inner.lock().record_transfer(
            from_account,
            to_account,
            amount,
            description,
            from_before,
            from_after,
            to_before,
            to_after,
            owner,
        )
    }

    pub fn reverse(&self, id: &EntryId, reason: &str) -> Result<(), LedgerError> {
        self.inner.lock().reverse(id, reason)
    }

    pub fn set_status(&self, id: &EntryId, status: EntryStatus) -> Result<(), LedgerError> {
        self.inner.lock().set_status(id, status)
    }

    pub fn save(&self) -> Result<(), LedgerError> {
        self.inner.lock().save()
    }

    pub fn load(&self) -> Result<(), LedgerError> {
        self.inner.lock().load()
    }

    pub fn export_csv(
        &self,
        path: impl AsRef<Path>,
        account_filter: Option<&str>,
    ) -> Result<usize, LedgerError> {
        self.inner.lock().export_csv(path, account_filter)
    }

    pub fn backup(&self, directory: impl AsRef<Path>) -> Result<PathBuf, LedgerError> {
        self.inner.lock().backup(directory)
    }

    pub fn cleanup_older_than(&self, days: u32) -> usize {
        self.inner.lock().cleanup_older_than(days)
    }

    pub fn reindex(&self) {
        self.inner.lock().reindex();
    }

    /// Runs a closure against the ledger under the lock; the place for
    /// queries and analytics.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.inner.lock())
    }
}
