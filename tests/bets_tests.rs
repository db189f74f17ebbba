// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::Decimal;
use stakeplan::error::LedgerError;
use stakeplan::models::Period;
use stakeplan::{capital, cli, commands, db, weekly_plan};
use std::str::FromStr;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn run(conn: &mut Connection, args: &[&str]) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from(args);
    match matches.subcommand() {
        Some(("bet", sub)) => commands::bets::handle(conn, sub),
        Some(("plan", sub)) => commands::plans::handle(conn, sub),
        _ => panic!("unexpected subcommand"),
    }
}

fn add(conn: &mut Connection, result: &str, odds: &str) {
    run(
        conn,
        &[
            "stakeplan", "bet", "add", "--match", "Arsenal v Chelsea", "--league", "EPL",
            "--date", "2025-04-09", "--odds", odds, "--stake", "250", "--result", result,
            "--today", "2025-04-09",
        ],
    )
    .unwrap();
}

fn april_week2(conn: &Connection) -> stakeplan::models::WeeklyPlan {
    weekly_plan::find(conn, Period::new(3, 2025).unwrap(), 2)
        .unwrap()
        .unwrap()
}

#[test]
fn add_win_moves_capital_and_plan() {
    let mut conn = setup();
    run(
        &mut conn,
        &["stakeplan", "plan", "set", "--week", "2", "--unit", "5", "--today", "2025-04-09"],
    )
    .unwrap();
    add(&mut conn, "win", "1.8");

    let state = capital::require(&conn).unwrap();
    assert_eq!(state.current_capital, d("5200"));
    assert_eq!(state.monthly_capital[0].current_capital, d("5200"));
    let plan = april_week2(&conn);
    assert_eq!((plan.bets_placed, plan.bets_won), (1, 1));
}

#[test]
fn edit_and_remove_keep_ledgers_consistent() {
    let mut conn = setup();
    run(
        &mut conn,
        &["stakeplan", "plan", "set", "--week", "2", "--today", "2025-04-09"],
    )
    .unwrap();
    add(&mut conn, "win", "1.8");
    run(&mut conn, &["stakeplan", "bet", "edit", "1", "--result", "loss"]).unwrap();
    assert_eq!(capital::require(&conn).unwrap().current_capital, d("4750"));

    run(&mut conn, &["stakeplan", "bet", "rm", "1"]).unwrap();
    assert_eq!(capital::require(&conn).unwrap().current_capital, d("5000"));
    let plan = april_week2(&conn);
    assert_eq!(
        (plan.bets_placed, plan.bets_won, plan.bets_lost, plan.bets_pending),
        (0, 0, 0, 0)
    );
}

#[test]
fn bets_without_a_plan_still_move_capital() {
    let mut conn = setup();
    add(&mut conn, "loss", "2.1");
    assert_eq!(capital::require(&conn).unwrap().current_capital, d("4750"));
    assert!(weekly_plan::find(&conn, Period::new(3, 2025).unwrap(), 2)
        .unwrap()
        .is_none());
}

#[test]
fn list_filters_and_limits() {
    let mut conn = setup();
    add(&mut conn, "win", "1.8");
    add(&mut conn, "pending", "1.9");
    add(&mut conn, "pending", "2.0");

    let matches = cli::build_cli().get_matches_from([
        "stakeplan", "bet", "list", "--result", "pending", "--limit", "1",
    ]);
    if let Some(("bet", bet_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = bet_m.subcommand() {
            let page = commands::bets::query_page(&conn, list_m).unwrap();
            assert_eq!(page.total, 2);
            assert_eq!(page.bets.len(), 1);
            assert!(page.has_more);
            // same date, so the newest id comes first
            assert_eq!(page.bets[0].id, 3);
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no bet subcommand");
    }
}

#[test]
fn rejects_bad_input() {
    let mut conn = setup();
    let err = run(
        &mut conn,
        &[
            "stakeplan", "bet", "add", "--match", "A v B", "--league", "EPL", "--odds", "0.9",
            "--stake", "10", "--today", "2025-04-09",
        ],
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LedgerError>(),
        Some(LedgerError::InvalidInput(_))
    ));

    let err = run(&mut conn, &["stakeplan", "bet", "rm", "42"]).unwrap_err();
    assert_eq!(err.downcast_ref::<LedgerError>().unwrap().code(), "NOT_FOUND");

    assert!(run(
        &mut conn,
        &[
            "stakeplan", "bet", "add", "--match", "A v B", "--league", "EPL", "--odds", "2",
            "--stake", "10", "--result", "void",
        ],
    )
    .is_err());
}
