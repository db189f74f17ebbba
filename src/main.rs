// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use stakeplan::error::LedgerError;
use stakeplan::{capital, cli, commands, db};

const LOG_ENV: &str = "STAKEPLAN_LOG";

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            let state = capital::get_or_initialize(&mut conn)?;
            println!(
                "Database initialized at {} ({} months scheduled)",
                db::db_path()?.display(),
                state.monthly_capital.len()
            );
        }
        Some(("capital", sub)) => commands::capital::handle(&mut conn, sub)?,
        Some(("bet", sub)) => commands::bets::handle(&mut conn, sub)?,
        Some(("plan", sub)) => commands::plans::handle(&mut conn, sub)?,
        Some(("stats", sub)) => commands::stats::handle_stats(&conn, sub)?,
        Some(("summary", sub)) => commands::stats::handle_summary(&mut conn, sub)?,
        Some(("settings", sub)) => commands::settings::handle(&mut conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

fn main() {
    init_logging();
    if let Err(e) = run() {
        match e.downcast_ref::<LedgerError>() {
            Some(le) => eprintln!("error[{}]: {:#}", le.code(), e),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}
