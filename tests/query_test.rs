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

//! Query view and analytics integration tests.
//!
//! Entries are appended directly with crafted identifiers and timestamps so
//! the date-sensitive views can be exercised deterministically.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;
use txn_ledger::{
    EntryId, EntryKind, EntryStatus, FixedClock, Ledger, LedgerEntry,
};

fn test_ledger() -> (Ledger, TempDir) {
    let dir = TempDir::new().unwrap();
    let clock = FixedClock(
        NaiveDate::from_ymd_opt(2025, 1, 22)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap(),
    );
    let ledger = Ledger::with_clock(
        dir.path().join("records.log"),
        dir.path().join("audit.log"),
        Box::new(clock),
    );
    (ledger, dir)
}

fn push(
    ledger: &mut Ledger,
    id: &str,
    account: &str,
    owner: &str,
    kind: EntryKind,
    amount: Decimal,
    timestamp: &str,
) {
    let entry = LedgerEntry::new(
        EntryId::from(id),
        account,
        kind,
        amount,
        "",
        dec!(0.00),
        amount,
        owner,
        timestamp,
    );
    ledger.append(entry).unwrap();
}

fn seeded_ledger() -> (Ledger, TempDir) {
    let (mut ledger, dir) = test_ledger();
    push(&mut ledger, "TXN20250120001", "SAV001", "CUST001", EntryKind::Deposit, dec!(100.00), "2025-01-20 09:00:00");
    push(&mut ledger, "TXN20250120002", "SAV001", "CUST001", EntryKind::Withdrawal, dec!(30.00), "2025-01-20 15:00:00");
    push(&mut ledger, "TXN20250121003", "SAV001", "CUST001", EntryKind::Deposit, dec!(50.00), "2025-01-21 09:00:00");
    push(&mut ledger, "TXN20250121004", "CHK001", "CUST002", EntryKind::FeeCharge, dec!(2.50), "2025-01-21 12:00:00");
    push(&mut ledger, "TXN20250122005", "SAV001", "CUST001", EntryKind::InterestCredit, dec!(1.00), "2025-01-22 00:00:00");
    push(&mut ledger, "TXN20250122006", "CHK001", "CUST002", EntryKind::Deposit, dec!(500.00), "2025-01-22 08:00:00");
    (ledger, dir)
}

#[test]
fn account_history_is_newest_first() {
    let (ledger, _dir) = seeded_ledger();
    let history = ledger.account_history("SAV001", 50);
    let timestamps: Vec<&str> = history.iter().map(|entry| entry.timestamp()).collect();
    assert_eq!(
        timestamps,
        vec![
            "2025-01-22 00:00:00",
            "2025-01-21 09:00:00",
            "2025-01-20 15:00:00",
            "2025-01-20 09:00:00",
        ]
    );
}

#[test]
fn account_history_limit_keeps_the_newest() {
    let (ledger, _dir) = seeded_ledger();
    let history = ledger.account_history("SAV001", 2);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].timestamp(), "2025-01-22 00:00:00");
    assert_eq!(history[1].timestamp(), "2025-01-21 09:00:00");
}

#[test]
fn unknown_account_history_is_empty() {
    let (ledger, _dir) = seeded_ledger();
    assert!(ledger.account_history("NOPE", 50).is_empty());
}

#[test]
fn owner_history_spans_accounts() {
    let (ledger, _dir) = seeded_ledger();
    let history = ledger.owner_history("CUST002", 50);
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|entry| entry.owner() == "CUST002"));
    assert_eq!(history[0].timestamp(), "2025-01-22 08:00:00");
}

#[test]
fn entries_by_kind_filters_and_sorts() {
    let (ledger, _dir) = seeded_ledger();
    let deposits = ledger.entries_by_kind(EntryKind::Deposit, 50);
    assert_eq!(deposits.len(), 3);
    assert_eq!(deposits[0].timestamp(), "2025-01-22 08:00:00");
    assert_eq!(deposits[2].timestamp(), "2025-01-20 09:00:00");
}

#[test]
fn date_range_is_inclusive_on_both_bounds() {
    let (ledger, _dir) = seeded_ledger();
    let entries = ledger.entries_by_date_range("2025-01-20", "2025-01-21");
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().all(|entry| {
        entry.date() == "2025-01-20" || entry.date() == "2025-01-21"
    }));

    // An entry dated exactly on a bound appears.
    let single_day = ledger.entries_by_date_range("2025-01-22", "2025-01-22");
    assert_eq!(single_day.len(), 2);
}

#[test]
fn date_range_empty_bounds_are_unbounded() {
    let (ledger, _dir) = seeded_ledger();
    assert_eq!(ledger.entries_by_date_range("", "").len(), 6);
    assert_eq!(ledger.entries_by_date_range("2025-01-21", "").len(), 4);
    assert_eq!(ledger.entries_by_date_range("", "2025-01-20").len(), 2);
}

#[test]
fn amount_range_sorts_by_signed_net_amount() {
    let (ledger, _dir) = seeded_ledger();
    let entries = ledger.entries_by_amount_range(dec!(-50.00), dec!(100.00));
    let nets: Vec<Decimal> = entries.iter().map(|entry| entry.net_amount()).collect();
    // Withdrawal -30.00, fee -2.50, interest 1.00, deposits 50.00 and 100.00.
    assert_eq!(
        nets,
        vec![dec!(-30.00), dec!(-2.50), dec!(1.00), dec!(50.00), dec!(100.00)]
    );
}

#[test]
fn failed_newest_first_and_pending_oldest_first() {
    let (mut ledger, _dir) = seeded_ledger();
    ledger
        .set_status(&EntryId::from("TXN20250120001"), EntryStatus::Pending)
        .unwrap();
    ledger
        .set_status(&EntryId::from("TXN20250121003"), EntryStatus::Pending)
        .unwrap();
    ledger
        .set_status(&EntryId::from("TXN20250120002"), EntryStatus::Failed)
        .unwrap();
    ledger
        .set_status(&EntryId::from("TXN20250122006"), EntryStatus::Failed)
        .unwrap();

    let pending = ledger.pending_entries();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].timestamp(), "2025-01-20 09:00:00");
    assert_eq!(pending[1].timestamp(), "2025-01-21 09:00:00");

    let failed = ledger.failed_entries();
    assert_eq!(failed.len(), 2);
    assert_eq!(failed[0].timestamp(), "2025-01-22 08:00:00");
    assert_eq!(failed[1].timestamp(), "2025-01-20 15:00:00");
}

#[test]
fn totals_and_net_flow() {
    let (mut ledger, _dir) = seeded_ledger();
    // An outbound transfer leg counts toward withdrawals.
    push(
        &mut ledger,
        "TXN20250122007",
        "SAV001",
        "CUST001",
        EntryKind::TransferOut,
        dec!(20.00),
        "2025-01-22 09:00:00",
    );

    assert_eq!(ledger.total_deposits("SAV001", "", ""), dec!(150.00));
    assert_eq!(ledger.total_withdrawals("SAV001", "", ""), dec!(50.00));
    assert_eq!(
        ledger.net_flow("SAV001", "", ""),
        ledger.total_deposits("SAV001", "", "") - ledger.total_withdrawals("SAV001", "", "")
    );
    assert_eq!(ledger.net_flow("SAV001", "", ""), dec!(100.00));
}

#[test]
fn totals_respect_inclusive_date_bounds() {
    let (ledger, _dir) = seeded_ledger();
    assert_eq!(
        ledger.total_deposits("SAV001", "2025-01-20", "2025-01-20"),
        dec!(100.00)
    );
    assert_eq!(
        ledger.total_deposits("SAV001", "2025-01-21", ""),
        dec!(50.00)
    );
    assert_eq!(
        ledger.total_withdrawals("SAV001", "2025-01-21", "2025-01-22"),
        dec!(0.00)
    );
}

#[test]
fn entry_count_with_and_without_bounds() {
    let (ledger, _dir) = seeded_ledger();
    assert_eq!(ledger.entry_count("SAV001", "", ""), 4);
    assert_eq!(ledger.entry_count("SAV001", "2025-01-20", "2025-01-20"), 2);
    assert_eq!(ledger.entry_count("NOPE", "", ""), 0);
}

#[test]
fn average_amount_by_kind() {
    let (ledger, _dir) = seeded_ledger();
    assert_eq!(
        ledger.average_amount("SAV001", EntryKind::Deposit),
        dec!(75.00)
    );
    assert_eq!(
        ledger.average_amount("SAV001", EntryKind::FeeCharge),
        Decimal::ZERO
    );
}

#[test]
fn statistics_counts_statuses_and_kinds() {
    let (mut ledger, _dir) = seeded_ledger();
    ledger
        .set_status(&EntryId::from("TXN20250120002"), EntryStatus::Failed)
        .unwrap();

    let stats = ledger.statistics();
    assert_eq!(stats.total_entries, 6);
    assert_eq!(stats.completed, 5);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.by_kind[&EntryKind::Deposit], 3);
    assert_eq!(stats.by_kind[&EntryKind::Withdrawal], 1);
    // 100 - 30 + 50 - 2.50 + 1 + 500
    assert_eq!(stats.total_volume, dec!(618.50));
    assert_eq!(ledger.total_volume(), dec!(618.50));
}

#[test]
fn daily_totals_group_by_kind() {
    let (ledger, _dir) = seeded_ledger();
    let totals = ledger.daily_totals("2025-01-20");
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[&EntryKind::Deposit].count, 1);
    assert_eq!(totals[&EntryKind::Deposit].amount, dec!(100.00));
    assert_eq!(totals[&EntryKind::Withdrawal].amount, dec!(30.00));
    assert!(ledger.daily_totals("2024-12-31").is_empty());
}
