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

//! Flat-file persistence, CSV export, backups and index maintenance.
//!
//! Record file layout: line 1 is the decimal entry count; each following
//! line holds the 13 fields of one entry in a fixed order, whitespace
//! separated. Free-text fields are escaped (`\s` space, `\t` tab, `\n`/`\r`
//! newlines, `\\` backslash, a lone `\-` for the empty string) so embedded
//! whitespace survives a round-trip; monetary fields are written at 2-decimal
//! fixed precision. The timestamp is written literally — its single interior
//! space sits at a fixed token position, so parsing stays deterministic.
//! Loading stops after the declared count and ignores trailing data.

use crate::base::EntryId;
use crate::entry::{EntryKind, EntryStatus, LedgerEntry};
use crate::error::LedgerError;
use crate::ledger::Ledger;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

impl Ledger {
    /// Writes the whole store to the record file.
    pub fn save(&self) -> Result<(), LedgerError> {
        let file = File::create(&self.record_path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", self.entries.len())?;
        for entry in self.entries.values() {
            writeln!(writer, "{}", encode_entry(entry))?;
        }
        writer.flush()?;
        info!(path = %self.record_path.display(), entries = self.entries.len(), "ledger saved");
        Ok(())
    }

    /// Replaces the in-memory store with the record file's contents and
    /// recovers the sequence counter from the loaded identifiers.
    ///
    /// A missing file is not an error: the ledger starts empty.
    pub fn load(&mut self) -> Result<(), LedgerError> {
        if !self.record_path.exists() {
            info!(path = %self.record_path.display(), "no record file; starting empty");
            return Ok(());
        }
        let file = File::open(&self.record_path)?;
        let mut lines = BufReader::new(file).lines();
        let count_line = lines.next().transpose()?.unwrap_or_default();
        let count: usize = count_line
            .trim()
            .parse()
            .map_err(|_| LedgerError::CorruptRecord {
                line: 1,
                reason: format!("invalid entry count {count_line:?}"),
            })?;

        self.entries.clear();
        self.index.clear();
        self.next_sequence = 1;
        for record in 0..count {
            let line_number = record + 2;
            let line = lines
                .next()
                .transpose()?
                .ok_or_else(|| LedgerError::CorruptRecord {
                    line: line_number,
                    reason: "unexpected end of file".into(),
                })?;
            let entry = decode_entry(&line, line_number)?;
            if self.entries.contains_key(entry.id()) {
                return Err(LedgerError::CorruptRecord {
                    line: line_number,
                    reason: format!("duplicate entry ID {}", entry.id()),
                });
            }
            if let Some(sequence) = entry.id().sequence() {
                if sequence >= self.next_sequence {
                    self.next_sequence = sequence + 1;
                }
            }
            self.index.insert(&entry);
            self.entries.insert(entry.id().clone(), entry);
        }
        info!(path = %self.record_path.display(), entries = count, "ledger loaded");
        Ok(())
    }

    /// Exports entries (optionally one account's) as CSV and returns the
    /// number of rows written.
    ///
    /// Fields with embedded delimiters come out quoted per RFC 4180.
    pub fn export_csv(
        &self,
        path: impl AsRef<Path>,
        account_filter: Option<&str>,
    ) -> Result<usize, LedgerError> {
        let mut writer = csv::Writer::from_path(path.as_ref())?;
        let mut rows = 0;
        for entry in self.entries.values() {
            if let Some(account) = account_filter {
                if entry.account() != account {
                    continue;
                }
            }
            writer.serialize(CsvRow {
                id: entry.id().as_str(),
                account: entry.account(),
                kind: entry.kind().ordinal(),
                amount: format!("{:.2}", entry.amount()),
                date: entry.date(),
                status: entry.status().label(),
                description: entry.description(),
            })?;
            rows += 1;
        }
        writer.flush()?;
        info!(path = %path.as_ref().display(), rows, "csv exported");
        Ok(rows)
    }

    /// Copies the record file byte-for-byte to
    /// `<directory>/transaction_backup_<stamp>.log` and returns the backup
    /// path. The stamp is the current instant in compact form.
    pub fn backup(&self, directory: impl AsRef<Path>) -> Result<PathBuf, LedgerError> {
        let stamp = self.clock.now().format("%Y%m%d_%H%M%S").to_string();
        let target = directory
            .as_ref()
            .join(format!("transaction_backup_{stamp}.log"));
        fs::copy(&self.record_path, &target)?;
        info!(path = %target.display(), "backup created");
        Ok(target)
    }

    /// Removes entries dated strictly before `today − days`, detaching only
    /// the removed identifiers from the indices. Returns the number removed.
    pub fn cleanup_older_than(&mut self, days: u32) -> usize {
        let cutoff = (self.clock.now().date() - chrono::Duration::days(i64::from(days)))
            .format("%Y-%m-%d")
            .to_string();
        let stale: Vec<EntryId> = self
            .entries
            .values()
            .filter(|entry| entry.date() < cutoff.as_str())
            .map(|entry| entry.id().clone())
            .collect();
        for id in &stale {
            if let Some(entry) = self.entries.remove(id) {
                self.index.remove(&entry);
            }
        }
        if !stale.is_empty() {
            info!(removed = stale.len(), %cutoff, "old entries cleaned up");
        }
        stale.len()
    }

    /// Clears and rebuilds all three indices from the primary map. Always
    /// safe; used as a repair operation.
    pub fn reindex(&mut self) {
        self.index.clear();
        for entry in self.entries.values() {
            self.index.insert(entry);
        }
        info!(entries = self.entries.len(), "indices rebuilt");
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
    #[serde(rename = "Account")]
    account: &'a str,
    #[serde(rename = "Type")]
    kind: u8,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Date")]
    date: &'a str,
    #[serde(rename = "Status")]
    status: &'static str,
    #[serde(rename = "Description")]
    description: &'a str,
}

fn encode_entry(entry: &LedgerEntry) -> String {
    format!(
        "{} {} {} {} {:.2} {:.2} {:.2} {} {} {} {} {} {}",
        entry.id(),
        encode_field(entry.account()),
        encode_field(entry.related_account_raw()),
        entry.kind().ordinal(),
        entry.amount(),
        entry.balance_before(),
        entry.balance_after_raw(),
        entry.timestamp(),
        encode_field(entry.description_raw()),
        entry.status().ordinal(),
        encode_field(entry.owner_raw()),
        encode_field(entry.session_id_raw()),
        encode_field(entry.notes_raw()),
    )
}

fn decode_entry(line: &str, line_number: usize) -> Result<LedgerEntry, LedgerError> {
    let corrupt = |reason: String| LedgerError::CorruptRecord {
        line: line_number,
        reason,
    };
    let tokens: Vec<&str> = line.split_whitespace().collect();
    // 13 logical fields; the timestamp spans two tokens.
    if tokens.len() != 14 {
        return Err(corrupt(format!(
            "expected 14 tokens, found {}",
            tokens.len()
        )));
    }

    let id = EntryId::new(tokens[0]);
    let account =
        decode_field(tokens[1]).ok_or_else(|| corrupt("bad account encoding".into()))?;
    let related =
        decode_field(tokens[2]).ok_or_else(|| corrupt("bad related-account encoding".into()))?;
    let kind = tokens[3]
        .parse::<u8>()
        .ok()
        .and_then(EntryKind::from_ordinal)
        .ok_or_else(|| corrupt(format!("unknown kind ordinal {:?}", tokens[3])))?;
    let amount = parse_decimal(tokens[4]).ok_or_else(|| corrupt("bad amount".into()))?;
    let balance_before =
        parse_decimal(tokens[5]).ok_or_else(|| corrupt("bad balance-before".into()))?;
    let balance_after =
        parse_decimal(tokens[6]).ok_or_else(|| corrupt("bad balance-after".into()))?;
    let timestamp = format!("{} {}", tokens[7], tokens[8]);
    let description =
        decode_field(tokens[9]).ok_or_else(|| corrupt("bad description encoding".into()))?;
    let status = tokens[10]
        .parse::<u8>()
        .ok()
        .and_then(EntryStatus::from_ordinal)
        .ok_or_else(|| corrupt(format!("unknown status ordinal {:?}", tokens[10])))?;
    let owner = decode_field(tokens[11]).ok_or_else(|| corrupt("bad owner encoding".into()))?;
    let session_id =
        decode_field(tokens[12]).ok_or_else(|| corrupt("bad session encoding".into()))?;
    let notes = decode_field(tokens[13]).ok_or_else(|| corrupt("bad notes encoding".into()))?;

    let mut entry = LedgerEntry::new(
        id,
        account,
        kind,
        amount,
        description,
        balance_before,
        balance_after,
        owner,
        timestamp,
    );
    entry.set_related_account(related);
    entry.set_session_id(session_id);
    entry.set_notes(notes);
    entry.set_status(status);
    Ok(entry)
}

fn parse_decimal(token: &str) -> Option<Decimal> {
    Decimal::from_str(token).ok()
}

fn encode_field(value: &str) -> String {
    if value.is_empty() {
        return "\\-".to_owned();
    }
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ' ' => out.push_str("\\s"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

fn decode_field(token: &str) -> Option<String> {
    if token == "\\-" {
        return Some(String::new());
    }
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '\\' => out.push('\\'),
            's' => out.push(' '),
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            _ => return None,
        }
    }
    Some(out)
}
