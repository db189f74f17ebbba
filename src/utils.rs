// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::LedgerError;
use crate::models::Period;
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Parse `YYYY-MM` (one-based month) into a zero-based [`Period`].
pub fn parse_period(s: &str) -> Result<Period> {
    let s = s.trim();
    let d = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok(Period {
        year: d.year(),
        month: d.month0(),
    })
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Optional decimal argument.
pub fn arg_decimal(m: &clap::ArgMatches, id: &str) -> Result<Option<Decimal>> {
    m.get_one::<String>(id)
        .map(|s| parse_decimal(s).with_context(|| format!("--{}", id)))
        .transpose()
}

/// `--today` when given, else the local date.
pub fn arg_today(m: &clap::ArgMatches) -> Result<NaiveDate> {
    match m.get_one::<String>("today") {
        Some(s) => parse_date(s),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

/// Decode a TEXT money/ratio column.
pub fn read_decimal(field: &'static str, s: &str) -> Result<Decimal, LedgerError> {
    s.parse::<Decimal>().map_err(|_| LedgerError::Corrupt {
        field,
        value: s.to_string(),
    })
}

/// Round half up to a whole currency unit: `floor(x + 0.5)`.
pub fn round_half_up(d: Decimal) -> Decimal {
    // only values with no fractional digits left can overflow here
    match d.checked_add(Decimal::new(5, 1)) {
        Some(v) => v.floor(),
        None => d.floor(),
    }
}

/// Week of month, counting from the weekday the month starts on (Sunday = 0).
/// Never returns less than 1.
pub fn week_of_month(date: NaiveDate) -> u32 {
    let first_offset = date
        .with_day(1)
        .map(|d| d.weekday().num_days_from_sunday())
        .unwrap_or(0);
    let past_days = date.day() - 1;
    (past_days + first_offset).div_ceil(7).max(1)
}

pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    NAMES.get(month as usize).copied().unwrap_or("?")
}

pub fn fmt_money(d: &Decimal) -> String {
    d.round_dp(2).to_string()
}

pub fn fmt_pct(d: f64) -> String {
    format!("{:.1}%", d)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>, LedgerError> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<(), LedgerError> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
