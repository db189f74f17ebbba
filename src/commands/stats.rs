// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::bets::BetFilter;
use crate::capital;
use crate::stats::{self, CategoryStats};
use crate::summary;
use crate::utils::{fmt_money, fmt_pct, maybe_print_json, month_name, parse_period, pretty_table};
use anyhow::Result;
use comfy_table::Table;
use rusqlite::Connection;
use std::collections::BTreeMap;

pub fn handle_stats(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let mut filter = BetFilter {
        week: m.get_one::<u32>("week").copied(),
        league: m.get_one::<String>("league").cloned(),
        ..Default::default()
    };
    if let Some(s) = m.get_one::<String>("month") {
        let p = parse_period(s)?;
        filter.month = Some(p.month);
        filter.year = Some(p.year);
    }
    let s = stats::bet_stats(conn, &filter)?;
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &s)? {
        return Ok(());
    }
    let overview = vec![vec![
        s.total_bets.to_string(),
        s.wins.to_string(),
        s.losses.to_string(),
        s.pending.to_string(),
        fmt_money(&s.total_profit),
        fmt_money(&s.total_stake),
        fmt_pct(s.win_rate),
        fmt_pct(s.roi),
        format!("{:.2}", s.average_odds),
    ]];
    println!(
        "{}",
        pretty_table(
            &["Bets", "Wins", "Losses", "Pending", "Profit", "Stake", "Win rate", "ROI", "Avg odds"],
            overview
        )
    );
    if !s.league_stats.is_empty() {
        println!("{}", category_table("League", &s.league_stats));
    }
    if !s.bet_type_stats.is_empty() {
        println!("{}", category_table("Bet type", &s.bet_type_stats));
    }
    Ok(())
}

fn category_table(label: &str, stats: &BTreeMap<String, CategoryStats>) -> Table {
    let rows = stats
        .iter()
        .map(|(k, c)| {
            vec![
                k.clone(),
                c.bets.to_string(),
                c.wins.to_string(),
                c.losses.to_string(),
                fmt_money(&c.profit),
                fmt_pct(c.win_rate),
            ]
        })
        .collect();
    pretty_table(&[label, "Bets", "Wins", "Losses", "Profit", "Win rate"], rows)
}

pub fn handle_summary(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    capital::get_or_initialize(conn)?;
    let monthly = summary::monthly_summary(conn)?;
    let overview = summary::capital_overview(conn)?;
    if m.get_flag("json") || m.get_flag("jsonl") {
        let v = serde_json::json!({ "capital": overview, "summary": monthly });
        maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &v)?;
        return Ok(());
    }

    println!(
        "{} {}: start {} | now {} | target {} | P/L {} | progress {}%",
        month_name(overview.month),
        overview.year,
        fmt_money(&overview.initial_capital),
        fmt_money(&overview.current_capital),
        fmt_money(&overview.target_capital),
        fmt_money(&overview.profit_loss),
        overview.progress
    );
    let mut rows: Vec<Vec<String>> = monthly
        .weeks
        .iter()
        .map(|w| {
            vec![
                format!("Week {}", w.week),
                w.bets.to_string(),
                w.wins.to_string(),
                w.losses.to_string(),
                fmt_money(&w.profit),
                fmt_pct(w.roi),
            ]
        })
        .collect();
    rows.push(vec![
        "Total".into(),
        monthly.weeks.iter().map(|w| w.bets).sum::<i64>().to_string(),
        monthly.totals.wins.to_string(),
        monthly.totals.losses.to_string(),
        fmt_money(&monthly.totals.profit),
        fmt_pct(monthly.totals.roi),
    ]);
    println!(
        "{}",
        pretty_table(&["Week", "Bets", "Wins", "Losses", "Profit", "ROI"], rows)
    );
    Ok(())
}
