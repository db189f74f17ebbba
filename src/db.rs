// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Stakeplan", "stakeplan"));

/// Overrides the platform data dir when set.
pub const DB_ENV: &str = "STAKEPLAN_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("stakeplan.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    -- singleton row, id is always 1
    CREATE TABLE IF NOT EXISTS capital(
        id INTEGER PRIMARY KEY CHECK(id = 1),
        initial_capital TEXT NOT NULL,
        current_capital TEXT NOT NULL,
        monthly_growth_target TEXT NOT NULL,
        start_month INTEGER NOT NULL CHECK(start_month BETWEEN 0 AND 11),
        start_year INTEGER NOT NULL,
        current_month INTEGER NOT NULL CHECK(current_month BETWEEN 0 AND 11),
        current_year INTEGER NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS monthly_capital(
        seq INTEGER NOT NULL,
        month INTEGER NOT NULL CHECK(month BETWEEN 0 AND 11),
        year INTEGER NOT NULL,
        initial_capital TEXT NOT NULL,
        current_capital TEXT NOT NULL,
        target_capital TEXT NOT NULL,
        PRIMARY KEY(year, month)
    );
    CREATE INDEX IF NOT EXISTS idx_monthly_capital_seq ON monthly_capital(seq);

    CREATE TABLE IF NOT EXISTS weekly_plans(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        month INTEGER NOT NULL,
        year INTEGER NOT NULL,
        week INTEGER NOT NULL,
        target_bets INTEGER NOT NULL,
        average_odds TEXT NOT NULL,
        unit_size TEXT NOT NULL,
        bets_placed INTEGER NOT NULL DEFAULT 0,
        bets_won INTEGER NOT NULL DEFAULT 0,
        bets_lost INTEGER NOT NULL DEFAULT 0,
        bets_pending INTEGER NOT NULL DEFAULT 0,
        UNIQUE(month, year, week)
    );

    -- period columns are stamped at creation and never recomputed
    CREATE TABLE IF NOT EXISTS bets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        match_name TEXT NOT NULL,
        league TEXT NOT NULL,
        date TEXT NOT NULL,
        odds TEXT NOT NULL,
        stake TEXT NOT NULL,
        bet_type TEXT NOT NULL CHECK(bet_type IN ('Win','Draw','Over','Under','BTTS','Other')),
        result TEXT NOT NULL CHECK(result IN ('Win','Loss','Pending')),
        profit TEXT NOT NULL DEFAULT '0',
        notes TEXT,
        month INTEGER NOT NULL,
        year INTEGER NOT NULL,
        week INTEGER NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_bets_period ON bets(year, month, week);
    CREATE INDEX IF NOT EXISTS idx_bets_date ON bets(date);
    "#,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        let n: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('capital','monthly_capital','weekly_plans','bets','settings')",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(n, 5);
    }

    #[test]
    fn capital_is_a_singleton() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let err = conn.execute(
            "INSERT INTO capital(id, initial_capital, current_capital, monthly_growth_target, start_month, start_year, current_month, current_year)
             VALUES (2, '1', '1', '0.1', 0, 2025, 0, 2025)",
            [],
        );
        assert!(err.is_err());
    }
}
