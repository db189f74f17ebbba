// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::bets::{self, BetFilter, BetPage, BetPatch, NewBet};
use crate::capital;
use crate::models::{Bet, BetResult, BetType};
use crate::utils::{
    arg_decimal, arg_today, fmt_money, maybe_print_json, parse_date, parse_period, pretty_table,
};
use anyhow::{Context, Result};
use rusqlite::Connection;

fn arg_parse<T>(m: &clap::ArgMatches, id: &str) -> Result<Option<T>>
where
    T: std::str::FromStr<Err = crate::error::LedgerError>,
{
    m.get_one::<String>(id)
        .map(|s| s.parse::<T>().with_context(|| format!("--{}", id)))
        .transpose()
}

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let today = arg_today(sub)?;
            let input = NewBet {
                match_name: sub.get_one::<String>("match").context("--match")?.clone(),
                league: sub.get_one::<String>("league").context("--league")?.clone(),
                date: match sub.get_one::<String>("date") {
                    Some(s) => parse_date(s)?,
                    None => today,
                },
                odds: arg_decimal(sub, "odds")?.context("--odds")?,
                stake: arg_decimal(sub, "stake")?.context("--stake")?,
                bet_type: arg_parse::<BetType>(sub, "type")?.unwrap_or(BetType::Win),
                result: arg_parse::<BetResult>(sub, "result")?.unwrap_or(BetResult::Pending),
                notes: sub.get_one::<String>("notes").cloned(),
            };
            capital::get_or_initialize(conn)?;
            let bet = bets::create(conn, input, today)?;
            println!(
                "Recorded bet #{} ({}, week {}), profit {}",
                bet.id,
                bet.period(),
                bet.week,
                fmt_money(&bet.profit)
            );
        }
        Some(("edit", sub)) => {
            let id = *sub.get_one::<i64>("id").context("id")?;
            let patch = BetPatch {
                match_name: sub.get_one::<String>("match").cloned(),
                league: sub.get_one::<String>("league").cloned(),
                date: sub.get_one::<String>("date").map(|s| parse_date(s)).transpose()?,
                odds: arg_decimal(sub, "odds")?,
                stake: arg_decimal(sub, "stake")?,
                bet_type: arg_parse::<BetType>(sub, "type")?,
                result: arg_parse::<BetResult>(sub, "result")?,
                notes: sub.get_one::<String>("notes").cloned(),
            };
            let bet = bets::update(conn, id, patch)?;
            println!(
                "Updated bet #{}: {} at {}, profit {}",
                bet.id,
                bet.result,
                bet.odds,
                fmt_money(&bet.profit)
            );
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").context("id")?;
            let bet = bets::delete(conn, id)?;
            println!("Removed bet #{} ({})", bet.id, bet.match_name);
        }
        Some(("show", sub)) => {
            let id = *sub.get_one::<i64>("id").context("id")?;
            let bet = bets::get(conn, id)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &bet)? {
                return Ok(());
            }
            println!("{}", bets_table(std::slice::from_ref(&bet)));
            if let Some(n) = bet.notes {
                println!("Notes: {}", n);
            }
        }
        Some(("list", sub)) => {
            let page = query_page(conn, sub)?;
            if sub.get_flag("jsonl") {
                maybe_print_json(false, true, &page.bets)?;
                return Ok(());
            }
            if maybe_print_json(sub.get_flag("json"), false, &page)? {
                return Ok(());
            }
            println!("{}", bets_table(&page.bets));
            println!(
                "Showing {}-{} of {}{}",
                if page.bets.is_empty() { 0 } else { page.skip + 1 },
                page.skip + page.bets.len(),
                page.total,
                if page.has_more { " (more with --skip)" } else { "" }
            );
        }
        _ => {}
    }
    Ok(())
}

/// Resolve `bet list` arguments into a page of bets.
pub fn query_page(conn: &Connection, sub: &clap::ArgMatches) -> Result<BetPage> {
    let mut filter = BetFilter {
        week: sub.get_one::<u32>("week").copied(),
        result: arg_parse::<BetResult>(sub, "result")?,
        league: sub.get_one::<String>("league").cloned(),
        ..Default::default()
    };
    if let Some(s) = sub.get_one::<String>("month") {
        let p = parse_period(s)?;
        filter.month = Some(p.month);
        filter.year = Some(p.year);
    }
    let limit = sub
        .get_one::<usize>("limit")
        .copied()
        .unwrap_or(bets::DEFAULT_PAGE_SIZE);
    let skip = sub.get_one::<usize>("skip").copied().unwrap_or(0);
    Ok(bets::list(conn, &filter, limit, skip)?)
}

fn bets_table(bets: &[Bet]) -> comfy_table::Table {
    let rows = bets
        .iter()
        .map(|b| {
            vec![
                b.id.to_string(),
                b.date.to_string(),
                b.match_name.clone(),
                b.league.clone(),
                b.bet_type.to_string(),
                b.odds.to_string(),
                fmt_money(&b.stake),
                b.result.to_string(),
                fmt_money(&b.profit),
                format!("{} w{}", b.period(), b.week),
            ]
        })
        .collect();
    pretty_table(
        &[
            "ID", "Date", "Match", "League", "Type", "Odds", "Stake", "Result", "Profit", "Period",
        ],
        rows,
    )
}
