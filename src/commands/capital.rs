// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::capital::{self, CapitalEdit, ResetConfirmation, ScheduleUpdate};
use crate::models::{CapitalState, MonthEntry, Period};
use crate::projection;
use crate::settings::percent_to_ratio;
use crate::summary;
use crate::utils::{
    arg_decimal, fmt_money, maybe_print_json, month_name, parse_decimal, parse_period, pretty_table,
};
use anyhow::{Context, Result};
use comfy_table::Table;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let state = capital::get_or_initialize(conn)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &state)? {
                return Ok(());
            }
            print_state(&state);
        }
        Some(("edit", sub)) => {
            let edit = CapitalEdit {
                initial_capital: arg_decimal(sub, "initial")?,
                current_capital: arg_decimal(sub, "current")?,
                monthly_growth_target: arg_decimal(sub, "growth")?
                    .map(|p| percent_to_ratio("Monthly growth target", p))
                    .transpose()?,
            };
            capital::get_or_initialize(conn)?;
            let state = capital::edit_capital(conn, edit)?;
            println!(
                "Capital updated: initial {}, current {}, growth {}%",
                fmt_money(&state.initial_capital),
                fmt_money(&state.current_capital),
                (state.monthly_growth_target * Decimal::ONE_HUNDRED).normalize()
            );
        }
        Some(("month-edit", sub)) => {
            let period = parse_period(sub.get_one::<String>("month").context("--month")?)?;
            let initial = parse_decimal(sub.get_one::<String>("initial").context("--initial")?)?;
            capital::get_or_initialize(conn)?;
            let state = capital::edit_monthly_capital(conn, period, initial)?;
            println!(
                "Re-based {} {} at {}; {} later month(s) rolled forward",
                month_name(period.month),
                period.year,
                fmt_money(&initial),
                state
                    .monthly_capital
                    .iter()
                    .filter(|e| e.period() > period)
                    .count()
            );
        }
        Some(("schedule", sub)) => {
            let start = parse_period(sub.get_one::<String>("start").context("--start")?)?;
            let months = *sub.get_one::<u32>("months").context("--months")?;
            capital::get_or_initialize(conn)?;
            let state = capital::update_schedule(
                conn,
                ScheduleUpdate {
                    start_month: start.month,
                    start_year: start.year,
                    duration_months: months,
                },
            )?;
            println!(
                "Schedule regenerated: {} month(s) from {} {}",
                state.monthly_capital.len(),
                month_name(start.month),
                start.year
            );
        }
        Some(("advance", _)) => {
            capital::get_or_initialize(conn)?;
            let state = capital::advance_month(conn)?;
            print_pointer("Advanced", &state);
        }
        Some(("revert", _)) => {
            capital::get_or_initialize(conn)?;
            let state = capital::revert_month(conn)?;
            print_pointer("Reverted", &state);
        }
        Some(("reset", sub)) => {
            let token = ResetConfirmation::confirm(sub.get_flag("yes"))?;
            capital::get_or_initialize(conn)?;
            let state = capital::reset(conn, token)?;
            print_pointer("Reset", &state);
        }
        Some(("projection", sub)) => {
            let initial = parse_decimal(sub.get_one::<String>("initial").context("--initial")?)?;
            let rate = percent_to_ratio(
                "Monthly growth",
                parse_decimal(sub.get_one::<String>("growth").context("--growth")?)?,
            )?;
            let months = *sub.get_one::<u32>("months").context("--months")?;
            let start = parse_period(sub.get_one::<String>("start").context("--start")?)?;
            projection::validate_projection(rate, months)?;
            let entries = projection::project(initial, rate, months, start.month, start.year)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &entries)? {
                return Ok(());
            }
            println!("{}", schedule_table(&entries, None));
        }
        _ => {}
    }
    Ok(())
}

fn print_pointer(verb: &str, state: &CapitalState) {
    let p = state.current();
    println!(
        "{} to {} {} (capital {})",
        verb,
        month_name(p.month),
        p.year,
        fmt_money(&state.current_capital)
    );
}

fn schedule_table(entries: &[MonthEntry], current: Option<Period>) -> Table {
    let rows = entries
        .iter()
        .map(|e| {
            let marker = if Some(e.period()) == current { "*" } else { "" };
            vec![
                format!("{}{} {}", marker, month_name(e.month), e.year),
                fmt_money(&e.initial_capital),
                fmt_money(&e.current_capital),
                fmt_money(&e.target_capital),
                format!(
                    "{}%",
                    summary::progress(e.initial_capital, e.current_capital, e.target_capital)
                ),
            ]
        })
        .collect();
    pretty_table(&["Month", "Initial", "Current", "Target", "Progress"], rows)
}

fn print_state(state: &CapitalState) {
    let p = state.current();
    println!(
        "Initial {} | Current {} | Growth {}% | Month {} {}",
        fmt_money(&state.initial_capital),
        fmt_money(&state.current_capital),
        (state.monthly_growth_target * Decimal::ONE_HUNDRED).normalize(),
        month_name(p.month),
        p.year
    );
    println!("{}", schedule_table(&state.monthly_capital, Some(p)));
}
