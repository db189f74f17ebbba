// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::bets::{self, BetFilter};
use crate::capital;
use crate::utils::pretty_table;
use crate::weekly_plan;
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Consistency findings as (issue, detail) pairs.
pub fn check(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut issues = Vec::new();
    let Some(state) = capital::load(conn)? else {
        issues.push(("no_capital".into(), "run `stakeplan init`".into()));
        return Ok(issues);
    };

    // 1) current pointer must land on a schedule entry
    if state.current_entry().is_none() {
        issues.push(("pointer_without_entry".into(), state.current().to_string()));
    }

    // 2) each month's gain equals its settled bets' profit
    let mut settled: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for b in bets::matching(conn, &BetFilter::default())? {
        if b.result.is_settled() {
            let total = settled.entry((b.year, b.month)).or_default();
            *total = total.saturating_add(b.profit);
        }
    }
    for e in &state.monthly_capital {
        let gain = e.current_capital.saturating_sub(e.initial_capital);
        let profit = settled.remove(&(e.year, e.month)).unwrap_or_default();
        if gain != profit {
            issues.push((
                "capital_drift".into(),
                format!("{}: balance moved {} but bets made {}", e.period(), gain, profit),
            ));
        }
    }
    for ((year, month), profit) in settled {
        issues.push((
            "bets_outside_schedule".into(),
            format!("{:04}-{:02}: {} profit unaccounted", year, month + 1, profit),
        ));
    }

    // 3) plan counters
    for p in weekly_plan::list_all(conn)? {
        let counters = [p.bets_placed, p.bets_won, p.bets_lost, p.bets_pending];
        if counters.iter().any(|&n| n < 0) {
            issues.push((
                "negative_counters".into(),
                format!(
                    "{:04}-{:02} week {}: placed {}, won {}, lost {}, pending {}",
                    p.year,
                    p.month + 1,
                    p.week,
                    p.bets_placed,
                    p.bets_won,
                    p.bets_lost,
                    p.bets_pending
                ),
            ));
        }
        if !p.counters_balanced() {
            issues.push((
                "plan_counters".into(),
                format!(
                    "{:04}-{:02} week {}: placed {} != {} + {} + {}",
                    p.year,
                    p.month + 1,
                    p.week,
                    p.bets_placed,
                    p.bets_won,
                    p.bets_lost,
                    p.bets_pending
                ),
            ));
        }
    }
    Ok(issues)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let issues = check(conn)?;
    if issues.is_empty() {
        println!("doctor: no issues found");
    } else {
        let rows = issues.into_iter().map(|(a, b)| vec![a, b]).collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
