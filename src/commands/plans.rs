// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::capital;
use crate::models::Period;
use crate::settings;
use crate::utils::{arg_decimal, arg_today, fmt_money, maybe_print_json, parse_decimal, pretty_table};
use crate::weekly_plan::{self, PlanInput};
use anyhow::{Context, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let today = arg_today(sub)?;
            capital::get_or_initialize(conn)?;
            let view = weekly_plan::get_or_default(conn, sub.get_one::<u32>("week").copied(), today)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
                return Ok(());
            }
            let p = &view.weekly_plan;
            let s = &view.weekly_stats;
            println!(
                "Week {} of {}{}",
                p.week,
                Period {
                    year: p.year,
                    month: p.month
                },
                if view.persisted { "" } else { " (default, not saved)" }
            );
            let rows = vec![
                vec!["Target bets".into(), p.target_bets.to_string()],
                vec!["Average odds".into(), p.average_odds.to_string()],
                vec![
                    "Unit size".into(),
                    format!("{}%", (p.unit_size * Decimal::ONE_HUNDRED).normalize()),
                ],
                vec![
                    "Placed / won / lost / pending".into(),
                    format!(
                        "{} / {} / {} / {}",
                        p.bets_placed, p.bets_won, p.bets_lost, p.bets_pending
                    ),
                ],
                vec!["Target profit".into(), fmt_money(&s.target_profit)],
                vec!["Current profit".into(), fmt_money(&s.current_profit)],
                vec!["Stake per bet".into(), fmt_money(&s.stake_amount)],
                vec!["Win per bet".into(), fmt_money(&s.potential_win_per_bet)],
                vec![
                    "Wins needed".into(),
                    if s.wins_needed_clamped {
                        "n/a (win per bet is zero)".into()
                    } else {
                        s.wins_needed.to_string()
                    },
                ],
                vec!["Remaining bets".into(), s.remaining_bets.to_string()],
            ];
            println!("{}", pretty_table(&["Field", "Value"], rows));
        }
        Some(("set", sub)) => {
            let today = arg_today(sub)?;
            capital::get_or_initialize(conn)?;
            let unit_size_percent = match arg_decimal(sub, "unit")? {
                Some(p) => p,
                None => settings::get(conn)?.default_unit_size * Decimal::ONE_HUNDRED,
            };
            let input = PlanInput {
                week: sub.get_one::<u32>("week").copied(),
                target_bets: *sub.get_one::<i64>("target-bets").context("--target-bets")?,
                average_odds: parse_decimal(sub.get_one::<String>("odds").context("--odds")?)?,
                unit_size_percent,
            };
            let plan = weekly_plan::create_or_update(conn, input, today)?;
            println!(
                "Saved plan for week {}: {} bets at {} with {}% units",
                plan.week,
                plan.target_bets,
                plan.average_odds,
                (plan.unit_size * Decimal::ONE_HUNDRED).normalize()
            );
        }
        Some(("list", sub)) => {
            capital::get_or_initialize(conn)?;
            let plans = weekly_plan::list_for_current_month(conn)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &plans)? {
                return Ok(());
            }
            let rows = plans
                .iter()
                .map(|p| {
                    vec![
                        p.week.to_string(),
                        p.target_bets.to_string(),
                        p.average_odds.to_string(),
                        format!("{}%", (p.unit_size * Decimal::ONE_HUNDRED).normalize()),
                        p.bets_placed.to_string(),
                        p.bets_won.to_string(),
                        p.bets_lost.to_string(),
                        p.bets_pending.to_string(),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(
                    &["Week", "Target", "Odds", "Unit", "Placed", "Won", "Lost", "Pending"],
                    rows
                )
            );
        }
        _ => {}
    }
    Ok(())
}
