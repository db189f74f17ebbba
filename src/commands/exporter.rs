// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::bets::{self, BetFilter};
use anyhow::{Context, Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("bets", sub)) => export_bets(conn, sub),
        _ => Ok(()),
    }
}

fn export_bets(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub
        .get_one::<String>("format")
        .context("--format")?
        .to_lowercase();
    let out = sub.get_one::<String>("out").context("--out")?;

    let mut all = bets::matching(conn, &BetFilter::default())?;
    // oldest first in files
    all.reverse();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Create {}", out))?;
            wtr.write_record([
                "id", "date", "match", "league", "bet_type", "odds", "stake", "result", "profit",
                "month", "year", "week", "notes",
            ])?;
            for b in &all {
                wtr.write_record([
                    b.id.to_string(),
                    b.date.to_string(),
                    b.match_name.clone(),
                    b.league.clone(),
                    b.bet_type.to_string(),
                    b.odds.to_string(),
                    b.stake.to_string(),
                    b.result.to_string(),
                    b.profit.to_string(),
                    // one-based, as shown everywhere else
                    (b.month + 1).to_string(),
                    b.year.to_string(),
                    b.week.to_string(),
                    b.notes.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&all)?)
                .with_context(|| format!("Write {}", out))?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    println!("Exported {} bet(s) to {}", all.len(), out);
    Ok(())
}
