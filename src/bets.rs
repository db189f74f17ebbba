// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Bet ledger.
//!
//! Creating, editing or deleting a bet also moves the capital of the month
//! the bet is stamped to and the counters of that week's plan. The three
//! writes share one transaction: either all land or none do.
//!
//! A bet's month/year/week stamp is taken when it is created and never
//! recomputed, so later moves of the current-month pointer do not re-home
//! old bets.

use crate::capital;
use crate::error::{LedgerError, Result};
use crate::models::{Bet, BetResult, BetType, Period};
use crate::utils::{read_decimal, round_half_up, week_of_month};
use crate::weekly_plan::{self, CountDelta};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone)]
pub struct NewBet {
    pub match_name: String,
    pub league: String,
    pub date: NaiveDate,
    pub odds: Decimal,
    pub stake: Decimal,
    pub bet_type: BetType,
    pub result: BetResult,
    pub notes: Option<String>,
}

/// Partial edit; `None` keeps the stored value. Blank `notes` clear them.
#[derive(Debug, Clone, Default)]
pub struct BetPatch {
    pub match_name: Option<String>,
    pub league: Option<String>,
    pub date: Option<NaiveDate>,
    pub odds: Option<Decimal>,
    pub stake: Option<Decimal>,
    pub bet_type: Option<BetType>,
    pub result: Option<BetResult>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BetFilter {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub week: Option<u32>,
    pub result: Option<BetResult>,
    pub league: Option<String>,
}

impl BetFilter {
    pub fn for_week(period: Period, week: u32) -> Self {
        BetFilter {
            month: Some(period.month),
            year: Some(period.year),
            week: Some(week),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BetPage {
    pub bets: Vec<Bet>,
    pub total: usize,
    pub limit: usize,
    pub skip: usize,
    pub has_more: bool,
}

/// Profit realised by a bet: whole-unit winnings, the stake on a loss,
/// nothing while pending.
pub fn compute_profit(stake: Decimal, odds: Decimal, result: BetResult) -> Result<Decimal> {
    Ok(match result {
        BetResult::Win => round_half_up(
            stake
                .checked_mul(odds - Decimal::ONE)
                .ok_or_else(|| {
                    LedgerError::invalid(format!(
                        "Winnings for stake {} at odds {} are too large",
                        stake, odds
                    ))
                })?,
        ),
        BetResult::Loss => -stake,
        BetResult::Pending => Decimal::ZERO,
    })
}

fn clean_notes(notes: String) -> Option<String> {
    let trimmed = notes.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn validate_terms(stake: Decimal, odds: Decimal) -> Result<()> {
    if stake <= Decimal::ZERO {
        return Err(LedgerError::invalid(format!(
            "Stake must be positive, got {}",
            stake
        )));
    }
    if odds < Decimal::ONE {
        return Err(LedgerError::invalid(format!(
            "Odds must be at least 1, got {}",
            odds
        )));
    }
    Ok(())
}

fn validate_text(field: &str, v: &str) -> Result<()> {
    if v.trim().is_empty() {
        return Err(LedgerError::invalid(format!("{} must not be empty", field)));
    }
    Ok(())
}

const BET_COLUMNS: &str = "id, match_name, league, date, odds, stake, bet_type, result, profit,
     notes, month, year, week";

struct RawBet {
    id: i64,
    match_name: String,
    league: String,
    date: String,
    odds: String,
    stake: String,
    bet_type: String,
    result: String,
    profit: String,
    notes: Option<String>,
    month: u32,
    year: i32,
    week: u32,
}

fn raw_from_row(r: &Row<'_>) -> rusqlite::Result<RawBet> {
    Ok(RawBet {
        id: r.get(0)?,
        match_name: r.get(1)?,
        league: r.get(2)?,
        date: r.get(3)?,
        odds: r.get(4)?,
        stake: r.get(5)?,
        bet_type: r.get(6)?,
        result: r.get(7)?,
        profit: r.get(8)?,
        notes: r.get(9)?,
        month: r.get(10)?,
        year: r.get(11)?,
        week: r.get(12)?,
    })
}

fn decode(raw: RawBet) -> Result<Bet> {
    let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d").map_err(|_| {
        LedgerError::Corrupt {
            field: "bets.date",
            value: raw.date.clone(),
        }
    })?;
    let bet_type = raw.bet_type.parse::<BetType>().map_err(|_| LedgerError::Corrupt {
        field: "bets.bet_type",
        value: raw.bet_type.clone(),
    })?;
    let result = raw.result.parse::<BetResult>().map_err(|_| LedgerError::Corrupt {
        field: "bets.result",
        value: raw.result.clone(),
    })?;
    Ok(Bet {
        id: raw.id,
        match_name: raw.match_name,
        league: raw.league,
        date,
        odds: read_decimal("bets.odds", &raw.odds)?,
        stake: read_decimal("bets.stake", &raw.stake)?,
        bet_type,
        result,
        profit: read_decimal("bets.profit", &raw.profit)?,
        notes: raw.notes,
        month: raw.month,
        year: raw.year,
        week: raw.week,
    })
}

pub fn find(conn: &Connection, id: i64) -> Result<Option<Bet>> {
    let sql = format!("SELECT {} FROM bets WHERE id=?1", BET_COLUMNS);
    let raw = conn.query_row(&sql, params![id], raw_from_row).optional()?;
    raw.map(decode).transpose()
}

pub fn get(conn: &Connection, id: i64) -> Result<Bet> {
    find(conn, id)?.ok_or_else(|| LedgerError::not_found(format!("Bet {} not found", id)))
}

fn where_clause(filter: &BetFilter) -> (String, Vec<Value>) {
    let mut sql = String::from(" WHERE 1=1");
    let mut values: Vec<Value> = Vec::new();
    if let Some(m) = filter.month {
        sql.push_str(" AND month=?");
        values.push(Value::Integer(m as i64));
    }
    if let Some(y) = filter.year {
        sql.push_str(" AND year=?");
        values.push(Value::Integer(y as i64));
    }
    if let Some(w) = filter.week {
        sql.push_str(" AND week=?");
        values.push(Value::Integer(w as i64));
    }
    if let Some(r) = filter.result {
        sql.push_str(" AND result=?");
        values.push(Value::Text(r.as_str().to_string()));
    }
    if let Some(ref l) = filter.league {
        sql.push_str(" AND league=?");
        values.push(Value::Text(l.clone()));
    }
    (sql, values)
}

/// Every bet matching `filter`, newest first.
pub fn matching(conn: &Connection, filter: &BetFilter) -> Result<Vec<Bet>> {
    let (clause, values) = where_clause(filter);
    let sql = format!(
        "SELECT {} FROM bets{} ORDER BY date DESC, id DESC",
        BET_COLUMNS, clause
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(values.iter()), raw_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(decode(row?)?);
    }
    Ok(out)
}

pub fn list(conn: &Connection, filter: &BetFilter, limit: usize, skip: usize) -> Result<BetPage> {
    let (clause, mut values) = where_clause(filter);
    let count_sql = format!("SELECT COUNT(*) FROM bets{}", clause);
    let total: i64 = conn.query_row(
        &count_sql,
        rusqlite::params_from_iter(values.iter()),
        |r| r.get(0),
    )?;
    let total = total as usize;

    let sql = format!(
        "SELECT {} FROM bets{} ORDER BY date DESC, id DESC LIMIT ? OFFSET ?",
        BET_COLUMNS, clause
    );
    values.push(Value::Integer(limit as i64));
    values.push(Value::Integer(skip as i64));
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(values.iter()), raw_from_row)?;
    let mut bets = Vec::new();
    for row in rows {
        bets.push(decode(row?)?);
    }
    Ok(BetPage {
        bets,
        total,
        limit,
        skip,
        has_more: total > skip + limit,
    })
}

fn create_cascade(
    conn: &Connection,
    period: Period,
    week: u32,
    result: BetResult,
    profit: Decimal,
) -> Result<()> {
    if result.is_settled() {
        capital::apply_profit_delta(conn, period, profit)?;
    }
    weekly_plan::apply_bet_count_delta(conn, period, week, CountDelta::for_bet(result, 1))?;
    Ok(())
}

/// Record a bet against the current month and the week `today` falls in.
pub fn create(conn: &mut Connection, input: NewBet, today: NaiveDate) -> Result<Bet> {
    validate_text("Match name", &input.match_name)?;
    validate_text("League", &input.league)?;
    validate_terms(input.stake, input.odds)?;

    let tx = conn.transaction()?;
    let period = capital::require(&tx)?.current();
    let week = week_of_month(today);
    let profit = compute_profit(input.stake, input.odds, input.result)?;

    tx.execute(
        "INSERT INTO bets(match_name, league, date, odds, stake, bet_type, result, profit, notes, month, year, week)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            input.match_name.trim(),
            input.league.trim(),
            input.date.to_string(),
            input.odds.to_string(),
            input.stake.to_string(),
            input.bet_type.as_str(),
            input.result.as_str(),
            profit.to_string(),
            input.notes.and_then(clean_notes),
            period.month,
            period.year,
            week,
        ],
    )?;
    let id = tx.last_insert_rowid();
    create_cascade(&tx, period, week, input.result, profit)
        .map_err(|e| LedgerError::cascade("bet create", e))?;
    let bet = get(&tx, id)?;
    tx.commit()?;
    debug!(id, period = %period, week, profit = %profit, "bet recorded");
    Ok(bet)
}

fn update_cascade(conn: &Connection, bet: &Bet, new_result: BetResult, new_profit: Decimal) -> Result<()> {
    if new_result != bet.result {
        weekly_plan::apply_bet_count_delta(
            conn,
            bet.period(),
            bet.week,
            CountDelta::for_result_change(bet.result, new_result),
        )?;
    }
    let pending_both = bet.result == BetResult::Pending && new_result == BetResult::Pending;
    if new_profit != bet.profit && !pending_both {
        let delta = new_profit.checked_sub(bet.profit).ok_or_else(|| {
            LedgerError::invalid(format!(
                "Profit change from {} to {} is too large",
                bet.profit, new_profit
            ))
        })?;
        capital::apply_profit_delta(conn, bet.period(), delta)?;
    }
    Ok(())
}

/// Apply a partial edit. Profit is recomputed only when the result, odds or
/// stake is part of the patch; the difference lands on the bet's own month.
pub fn update(conn: &mut Connection, id: i64, patch: BetPatch) -> Result<Bet> {
    if let Some(ref m) = patch.match_name {
        validate_text("Match name", m)?;
    }
    if let Some(ref l) = patch.league {
        validate_text("League", l)?;
    }

    let tx = conn.transaction()?;
    let bet = get(&tx, id)?;

    let new_result = patch.result.unwrap_or(bet.result);
    let new_odds = patch.odds.unwrap_or(bet.odds);
    let new_stake = patch.stake.unwrap_or(bet.stake);
    validate_terms(new_stake, new_odds)?;

    let terms_changed = patch.result.is_some() || patch.odds.is_some() || patch.stake.is_some();
    let new_profit = if terms_changed {
        compute_profit(new_stake, new_odds, new_result)?
    } else {
        bet.profit
    };

    update_cascade(&tx, &bet, new_result, new_profit)
        .map_err(|e| LedgerError::cascade("bet update", e))?;

    tx.execute(
        "UPDATE bets SET match_name=?1, league=?2, date=?3, odds=?4, stake=?5, bet_type=?6,
                result=?7, profit=?8, notes=?9
         WHERE id=?10",
        params![
            patch.match_name.as_deref().map(str::trim).unwrap_or(&bet.match_name),
            patch.league.as_deref().map(str::trim).unwrap_or(&bet.league),
            patch.date.unwrap_or(bet.date).to_string(),
            new_odds.to_string(),
            new_stake.to_string(),
            patch.bet_type.unwrap_or(bet.bet_type).as_str(),
            new_result.as_str(),
            new_profit.to_string(),
            match patch.notes {
                Some(n) => clean_notes(n),
                None => bet.notes.clone(),
            },
            id,
        ],
    )?;
    let updated = get(&tx, id)?;
    tx.commit()?;
    debug!(id, old = %bet.profit, new = %new_profit, "bet updated");
    Ok(updated)
}

fn delete_cascade(conn: &Connection, bet: &Bet) -> Result<()> {
    weekly_plan::apply_bet_count_delta(
        conn,
        bet.period(),
        bet.week,
        CountDelta::for_bet(bet.result, -1),
    )?;
    if bet.result.is_settled() {
        capital::apply_profit_delta(conn, bet.period(), -bet.profit)?;
    }
    Ok(())
}

/// Remove a bet and back its profit and counters out of its own period.
pub fn delete(conn: &mut Connection, id: i64) -> Result<Bet> {
    let tx = conn.transaction()?;
    let bet = get(&tx, id)?;
    delete_cascade(&tx, &bet).map_err(|e| LedgerError::cascade("bet delete", e))?;
    tx.execute("DELETE FROM bets WHERE id=?1", params![id])?;
    tx.commit()?;
    debug!(id, "bet deleted");
    Ok(bet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::weekly_plan::PlanInput;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    // 2025-04-09 is in week 2 of April 2025
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 9).unwrap()
    }

    fn april() -> Period {
        Period::new(3, 2025).unwrap()
    }

    fn setup() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        capital::get_or_initialize(&mut conn).unwrap();
        weekly_plan::create_or_update(
            &mut conn,
            PlanInput {
                week: Some(2),
                target_bets: 5,
                average_odds: d("1.8"),
                unit_size_percent: d("5"),
            },
            today(),
        )
        .unwrap();
        conn
    }

    fn new_bet(result: BetResult) -> NewBet {
        NewBet {
            match_name: "Arsenal v Chelsea".into(),
            league: "Premier League".into(),
            date: today(),
            odds: d("1.8"),
            stake: d("250"),
            bet_type: BetType::Win,
            result,
            notes: None,
        }
    }

    fn plan(conn: &Connection) -> crate::models::WeeklyPlan {
        weekly_plan::find(conn, april(), 2).unwrap().unwrap()
    }

    /// Σ(current − initial) for a month equals Σ profit of its settled bets.
    fn assert_conserved(conn: &Connection, period: Period) {
        let state = capital::require(conn).unwrap();
        let entry = state.entry(period).unwrap();
        let settled: Decimal = matching(
            conn,
            &BetFilter {
                month: Some(period.month),
                year: Some(period.year),
                ..Default::default()
            },
        )
        .unwrap()
        .iter()
        .filter(|b| b.result.is_settled())
        .map(|b| b.profit)
        .sum();
        assert_eq!(entry.current_capital - entry.initial_capital, settled);
    }

    #[test]
    fn profit_formula() {
        let profit = |stake, odds, result| compute_profit(d(stake), d(odds), result).unwrap();
        assert_eq!(profit("250", "1.8", BetResult::Win), d("200"));
        assert_eq!(profit("125", "1.9", BetResult::Win), d("113"));
        assert_eq!(profit("250", "1.8", BetResult::Loss), d("-250"));
        assert_eq!(profit("250", "1.8", BetResult::Pending), d("0"));
        assert!(compute_profit(Decimal::MAX, d("3"), BetResult::Win).is_err());
    }

    #[test]
    fn winning_bet_moves_capital_and_counters() {
        let mut conn = setup();
        let bet = create(&mut conn, new_bet(BetResult::Win), today()).unwrap();
        assert_eq!(bet.profit, d("200"));
        assert_eq!((bet.month, bet.year, bet.week), (3, 2025, 2));

        let state = capital::require(&conn).unwrap();
        assert_eq!(state.current_capital, d("5200"));
        let p = plan(&conn);
        assert_eq!((p.bets_placed, p.bets_won), (1, 1));
        assert!(p.counters_balanced());
        assert_conserved(&conn, april());
    }

    #[test]
    fn win_to_loss_applies_difference() {
        let mut conn = setup();
        let bet = create(&mut conn, new_bet(BetResult::Win), today()).unwrap();
        let bet = update(
            &mut conn,
            bet.id,
            BetPatch {
                result: Some(BetResult::Loss),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(bet.profit, d("-250"));
        // 5200 - 450
        assert_eq!(capital::require(&conn).unwrap().current_capital, d("4750"));
        let p = plan(&conn);
        assert_eq!((p.bets_won, p.bets_lost, p.bets_placed), (0, 1, 1));
        assert_conserved(&conn, april());
    }

    #[test]
    fn deleting_pending_bet_only_touches_counters() {
        let mut conn = setup();
        let bet = create(&mut conn, new_bet(BetResult::Pending), today()).unwrap();
        assert_eq!(plan(&conn).bets_pending, 1);
        delete(&mut conn, bet.id).unwrap();
        let p = plan(&conn);
        assert_eq!((p.bets_placed, p.bets_pending), (0, 0));
        assert_eq!(capital::require(&conn).unwrap().current_capital, d("5000"));
        assert!(find(&conn, bet.id).unwrap().is_none());
    }

    #[test]
    fn deleting_settled_bet_reverses_profit() {
        let mut conn = setup();
        let bet = create(&mut conn, new_bet(BetResult::Loss), today()).unwrap();
        assert_eq!(capital::require(&conn).unwrap().current_capital, d("4750"));
        delete(&mut conn, bet.id).unwrap();
        assert_eq!(capital::require(&conn).unwrap().current_capital, d("5000"));
        assert_conserved(&conn, april());
    }

    #[test]
    fn edit_without_terms_keeps_profit() {
        let mut conn = setup();
        let bet = create(&mut conn, new_bet(BetResult::Win), today()).unwrap();
        let bet = update(
            &mut conn,
            bet.id,
            BetPatch {
                notes: Some("late goal".into()),
                league: Some("EPL".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(bet.profit, d("200"));
        assert_eq!(bet.league, "EPL");
        assert_eq!(bet.notes.as_deref(), Some("late goal"));
        assert_eq!(capital::require(&conn).unwrap().current_capital, d("5200"));
    }

    #[test]
    fn stake_change_on_pending_bet_moves_nothing() {
        let mut conn = setup();
        let bet = create(&mut conn, new_bet(BetResult::Pending), today()).unwrap();
        update(
            &mut conn,
            bet.id,
            BetPatch {
                stake: Some(d("500")),
                result: Some(BetResult::Pending),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(capital::require(&conn).unwrap().current_capital, d("5000"));
        assert_eq!(plan(&conn).bets_pending, 1);
    }

    #[test]
    fn settling_after_month_advance_hits_stamped_month() {
        let mut conn = setup();
        let bet = create(&mut conn, new_bet(BetResult::Pending), today()).unwrap();
        capital::advance_month(&mut conn).unwrap();
        update(
            &mut conn,
            bet.id,
            BetPatch {
                result: Some(BetResult::Win),
                ..Default::default()
            },
        )
        .unwrap();
        let state = capital::require(&conn).unwrap();
        // May is current, so only April's entry moves
        assert_eq!(state.current_capital, d("6000"));
        assert_eq!(state.entry(april()).unwrap().current_capital, d("5200"));
        let p = plan(&conn);
        assert_eq!((p.bets_won, p.bets_pending), (1, 0));
        assert_conserved(&conn, april());
    }

    #[test]
    fn unknown_bet_is_not_found() {
        let mut conn = setup();
        assert!(matches!(
            update(&mut conn, 99, BetPatch::default()).unwrap_err(),
            LedgerError::NotFound(_)
        ));
        assert!(matches!(delete(&mut conn, 99).unwrap_err(), LedgerError::NotFound(_)));
    }

    #[test]
    fn invalid_terms_are_rejected_without_writes() {
        let mut conn = setup();
        let mut bad = new_bet(BetResult::Win);
        bad.stake = d("0");
        assert!(create(&mut conn, bad, today()).is_err());
        let mut bad = new_bet(BetResult::Win);
        bad.odds = d("0.5");
        assert!(create(&mut conn, bad, today()).is_err());
        assert_eq!(plan(&conn).bets_placed, 0);
    }

    #[test]
    fn failed_cascade_rolls_back_bet() {
        let mut conn = setup();
        conn.execute_batch(
            "CREATE TRIGGER fail_plan BEFORE UPDATE ON weekly_plans
             BEGIN SELECT RAISE(ABORT, 'plan locked'); END;",
        )
        .unwrap();
        let err = create(&mut conn, new_bet(BetResult::Win), today()).unwrap_err();
        assert_eq!(err.code(), "CASCADE_FAILURE");
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM bets", [], |r| r.get(0))
            .unwrap();
        assert_eq!(n, 0);
        assert_eq!(capital::require(&conn).unwrap().current_capital, d("5000"));
    }

    fn lock_plans(conn: &Connection) {
        conn.execute_batch(
            "CREATE TRIGGER fail_plan BEFORE UPDATE ON weekly_plans
             BEGIN SELECT RAISE(ABORT, 'plan locked'); END;",
        )
        .unwrap();
    }

    #[test]
    fn failed_cascade_rolls_back_update() {
        let mut conn = setup();
        let bet = create(&mut conn, new_bet(BetResult::Win), today()).unwrap();
        let plan_before = plan(&conn);
        lock_plans(&conn);
        let err = update(
            &mut conn,
            bet.id,
            BetPatch {
                result: Some(BetResult::Loss),
                notes: Some("should not stick".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(err.code(), "CASCADE_FAILURE");
        assert_eq!(get(&conn, bet.id).unwrap(), bet);
        assert_eq!(plan(&conn), plan_before);
        assert_eq!(capital::require(&conn).unwrap().current_capital, d("5200"));
        assert_conserved(&conn, april());
    }

    #[test]
    fn failed_cascade_rolls_back_delete() {
        let mut conn = setup();
        let bet = create(&mut conn, new_bet(BetResult::Loss), today()).unwrap();
        lock_plans(&conn);
        let err = delete(&mut conn, bet.id).unwrap_err();
        assert_eq!(err.code(), "CASCADE_FAILURE");
        assert_eq!(get(&conn, bet.id).unwrap(), bet);
        assert_eq!(plan(&conn).bets_lost, 1);
        assert_eq!(capital::require(&conn).unwrap().current_capital, d("4750"));
        assert_conserved(&conn, april());
    }

    #[test]
    fn blank_notes_are_stored_as_none() {
        let mut conn = setup();
        let mut input = new_bet(BetResult::Pending);
        input.notes = Some("   ".into());
        let bet = create(&mut conn, input, today()).unwrap();
        assert_eq!(bet.notes, None);

        let bet = update(
            &mut conn,
            bet.id,
            BetPatch {
                notes: Some(" value bet ".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(bet.notes.as_deref(), Some("value bet"));

        let bet = update(
            &mut conn,
            bet.id,
            BetPatch {
                notes: Some(String::new()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(bet.notes, None);
        let stored: Option<String> = conn
            .query_row("SELECT notes FROM bets WHERE id=?1", [bet.id], |r| r.get(0))
            .unwrap();
        assert!(stored.is_none());
    }

    #[test]
    fn plan_created_after_bets_counts_them() {
        let mut conn = setup();
        // 2025-04-16 falls in week 3, which has no plan yet
        let later = NaiveDate::from_ymd_opt(2025, 4, 16).unwrap();
        let bet = create(&mut conn, new_bet(BetResult::Pending), later).unwrap();
        assert_eq!(bet.week, 3);
        let p = weekly_plan::create_or_update(
            &mut conn,
            PlanInput {
                week: Some(3),
                target_bets: 5,
                average_odds: d("1.8"),
                unit_size_percent: d("5"),
            },
            later,
        )
        .unwrap();
        assert_eq!((p.bets_placed, p.bets_pending), (1, 1));

        update(
            &mut conn,
            bet.id,
            BetPatch {
                result: Some(BetResult::Win),
                ..Default::default()
            },
        )
        .unwrap();
        delete(&mut conn, bet.id).unwrap();
        let p = weekly_plan::find(&conn, april(), 3).unwrap().unwrap();
        assert_eq!(
            (p.bets_placed, p.bets_won, p.bets_lost, p.bets_pending),
            (0, 0, 0, 0)
        );
    }

    #[test]
    fn conservation_holds_over_mixed_mutations() {
        let mut conn = setup();
        let a = create(&mut conn, new_bet(BetResult::Win), today()).unwrap();
        let b = create(&mut conn, new_bet(BetResult::Pending), today()).unwrap();
        let c = create(&mut conn, new_bet(BetResult::Loss), today()).unwrap();
        update(
            &mut conn,
            b.id,
            BetPatch {
                result: Some(BetResult::Win),
                odds: Some(d("2.35")),
                ..Default::default()
            },
        )
        .unwrap();
        update(
            &mut conn,
            a.id,
            BetPatch {
                stake: Some(d("100")),
                ..Default::default()
            },
        )
        .unwrap();
        delete(&mut conn, c.id).unwrap();
        update(
            &mut conn,
            a.id,
            BetPatch {
                result: Some(BetResult::Pending),
                ..Default::default()
            },
        )
        .unwrap();

        assert_conserved(&conn, april());
        let p = plan(&conn);
        assert!(p.counters_balanced());
        assert_eq!((p.bets_placed, p.bets_won, p.bets_pending), (2, 1, 1));
    }

    #[test]
    fn list_paginates_newest_first() {
        let mut conn = setup();
        for day in [1, 3, 2] {
            let mut b = new_bet(BetResult::Pending);
            b.date = NaiveDate::from_ymd_opt(2025, 4, day).unwrap();
            create(&mut conn, b, today()).unwrap();
        }
        let page = list(&conn, &BetFilter::default(), 2, 0).unwrap();
        assert_eq!(page.total, 3);
        assert!(page.has_more);
        let days: Vec<String> = page.bets.iter().map(|b| b.date.to_string()).collect();
        assert_eq!(days, vec!["2025-04-03", "2025-04-02"]);
        let page = list(&conn, &BetFilter::default(), 2, 2).unwrap();
        assert_eq!(page.bets.len(), 1);
        assert!(!page.has_more);
    }
}
