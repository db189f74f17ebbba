// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::settings;
use crate::utils::{arg_decimal, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn pct(d: Decimal) -> String {
    format!("{}%", (d * Decimal::ONE_HUNDRED).normalize())
}

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let s = settings::get(conn)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
                return Ok(());
            }
            println!(
                "{}",
                pretty_table(
                    &["Setting", "Value"],
                    vec![
                        vec!["Monthly growth target".into(), pct(s.monthly_growth_target)],
                        vec!["Default unit size".into(), pct(s.default_unit_size)],
                    ],
                )
            );
        }
        Some(("set", sub)) => {
            let current = settings::get(conn)?;
            let growth = arg_decimal(sub, "growth")?
                .unwrap_or(current.monthly_growth_target * Decimal::ONE_HUNDRED);
            let unit = arg_decimal(sub, "unit")?
                .unwrap_or(current.default_unit_size * Decimal::ONE_HUNDRED);
            let out = settings::update(conn, growth, unit)?;
            println!(
                "Settings saved: growth {}, unit size {}",
                pct(out.settings.monthly_growth_target),
                pct(out.settings.default_unit_size)
            );
            if out.capital.is_some() {
                println!("Capital schedule re-projected at the new growth target");
            }
        }
        _ => {}
    }
    Ok(())
}
