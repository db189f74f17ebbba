// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Weekly betting plans and the stats derived from them.

use crate::capital;
use crate::error::{LedgerError, Result};
use crate::models::{BetResult, CapitalState, Period, WeeklyPlan};
use crate::projection;
use crate::settings;
use crate::utils::{read_decimal, round_half_up, week_of_month};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use tracing::{debug, warn};

pub const DEFAULT_TARGET_BETS: i64 = 5;
pub const MAX_WEEK: u32 = 6;

fn default_average_odds() -> Decimal {
    Decimal::new(18, 1)
}

/// Signed adjustments to a plan's bet counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountDelta {
    pub placed: i64,
    pub won: i64,
    pub lost: i64,
    pub pending: i64,
}

impl CountDelta {
    /// One bet with `result` entering (`sign = 1`) or leaving (`sign = -1`).
    pub fn for_bet(result: BetResult, sign: i64) -> Self {
        let mut d = CountDelta {
            placed: sign,
            ..Default::default()
        };
        d.add_result(result, sign);
        d
    }

    /// A bet moving from one result to another; `placed` is unchanged.
    pub fn for_result_change(from: BetResult, to: BetResult) -> Self {
        let mut d = CountDelta::default();
        d.add_result(from, -1);
        d.add_result(to, 1);
        d
    }

    fn add_result(&mut self, result: BetResult, n: i64) {
        match result {
            BetResult::Win => self.won += n,
            BetResult::Loss => self.lost += n,
            BetResult::Pending => self.pending += n,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == CountDelta::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCapital {
    pub initial_capital: Decimal,
    pub current_capital: Decimal,
    pub target_capital: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyStats {
    pub target_profit: Decimal,
    pub current_profit: Decimal,
    pub stake_amount: Decimal,
    pub potential_win_per_bet: Decimal,
    pub wins_needed: i64,
    pub remaining_bets: i64,
    /// Set when the odds/stake make a winning bet worth nothing, so
    /// `wins_needed` could not be computed and was reported as 0.
    pub wins_needed_clamped: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyPlanView {
    pub weekly_plan: WeeklyPlan,
    pub persisted: bool,
    pub monthly_capital: MonthCapital,
    pub weekly_stats: WeeklyStats,
}

fn validate_week(week: u32) -> Result<()> {
    if week == 0 || week > MAX_WEEK {
        return Err(LedgerError::invalid(format!(
            "Week must be between 1 and {}, got {}",
            MAX_WEEK, week
        )));
    }
    Ok(())
}

fn plan_from_row(r: &Row<'_>) -> rusqlite::Result<(WeeklyPlan, String, String)> {
    Ok((
        WeeklyPlan {
            month: r.get(0)?,
            year: r.get(1)?,
            week: r.get(2)?,
            target_bets: r.get(3)?,
            average_odds: Decimal::ZERO,
            unit_size: Decimal::ZERO,
            bets_placed: r.get(6)?,
            bets_won: r.get(7)?,
            bets_lost: r.get(8)?,
            bets_pending: r.get(9)?,
        },
        r.get(4)?,
        r.get(5)?,
    ))
}

fn decode(raw: (WeeklyPlan, String, String)) -> Result<WeeklyPlan> {
    let (mut plan, odds, unit) = raw;
    plan.average_odds = read_decimal("weekly_plans.average_odds", &odds)?;
    plan.unit_size = read_decimal("weekly_plans.unit_size", &unit)?;
    Ok(plan)
}

const PLAN_COLUMNS: &str = "month, year, week, target_bets, average_odds, unit_size,
     bets_placed, bets_won, bets_lost, bets_pending";

pub fn find(conn: &Connection, period: Period, week: u32) -> Result<Option<WeeklyPlan>> {
    let sql = format!(
        "SELECT {} FROM weekly_plans WHERE month=?1 AND year=?2 AND week=?3",
        PLAN_COLUMNS
    );
    let raw = conn
        .query_row(&sql, params![period.month, period.year, week], plan_from_row)
        .optional()?;
    raw.map(decode).transpose()
}

pub fn list_for_period(conn: &Connection, period: Period) -> Result<Vec<WeeklyPlan>> {
    let sql = format!(
        "SELECT {} FROM weekly_plans WHERE month=?1 AND year=?2 ORDER BY week",
        PLAN_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![period.month, period.year], plan_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(decode(row?)?);
    }
    Ok(out)
}

pub fn list_all(conn: &Connection) -> Result<Vec<WeeklyPlan>> {
    let sql = format!(
        "SELECT {} FROM weekly_plans ORDER BY year, month, week",
        PLAN_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], plan_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(decode(row?)?);
    }
    Ok(out)
}

pub fn list_for_current_month(conn: &Connection) -> Result<Vec<WeeklyPlan>> {
    let state = capital::require(conn)?;
    list_for_period(conn, state.current())
}

fn transient_default(conn: &Connection, period: Period, week: u32) -> Result<WeeklyPlan> {
    Ok(WeeklyPlan {
        month: period.month,
        year: period.year,
        week,
        target_bets: DEFAULT_TARGET_BETS,
        average_odds: default_average_odds(),
        unit_size: settings::get(conn)?.default_unit_size,
        bets_placed: 0,
        bets_won: 0,
        bets_lost: 0,
        bets_pending: 0,
    })
}

pub fn month_capital(state: &CapitalState, period: Period) -> Result<MonthCapital> {
    Ok(match state.entry(period) {
        Some(e) => MonthCapital {
            initial_capital: e.initial_capital,
            current_capital: e.current_capital,
            target_capital: e.target_capital,
        },
        None => MonthCapital {
            initial_capital: state.initial_capital,
            current_capital: state.current_capital,
            target_capital: projection::target_for(
                state.initial_capital,
                state.monthly_growth_target,
            )?,
        },
    })
}

fn too_large(what: &str) -> LedgerError {
    LedgerError::invalid(format!("{} is too large to compute", what))
}

/// Sum of profit over every bet stamped to (period, week).
pub fn week_profit(conn: &Connection, period: Period, week: u32) -> Result<Decimal> {
    let mut stmt = conn
        .prepare_cached("SELECT profit FROM bets WHERE month=?1 AND year=?2 AND week=?3")?;
    let rows = stmt.query_map(params![period.month, period.year, week], |r| {
        r.get::<_, String>(0)
    })?;
    let mut total = Decimal::ZERO;
    for row in rows {
        total = total
            .checked_add(read_decimal("bets.profit", &row?)?)
            .ok_or_else(|| too_large("Weekly profit"))?;
    }
    Ok(total)
}

pub fn compute_stats(
    plan: &WeeklyPlan,
    capital: &MonthCapital,
    current_profit: Decimal,
) -> Result<WeeklyStats> {
    let gap = capital
        .target_capital
        .checked_sub(capital.initial_capital)
        .ok_or_else(|| too_large("Monthly target gap"))?;
    let target_profit = round_half_up(gap / Decimal::from(4));
    let stake_amount = round_half_up(
        capital
            .initial_capital
            .checked_mul(plan.unit_size)
            .ok_or_else(|| too_large("Stake per bet"))?,
    );
    let potential_win_per_bet = round_half_up(
        stake_amount
            .checked_mul(plan.average_odds - Decimal::ONE)
            .ok_or_else(|| too_large("Win per bet"))?,
    );

    let (wins_needed, wins_needed_clamped) = if potential_win_per_bet <= Decimal::ZERO {
        warn!(
            week = plan.week,
            odds = %plan.average_odds,
            stake = %stake_amount,
            "a winning bet earns nothing at these odds/stake; wins needed reported as 0"
        );
        (0, true)
    } else {
        let needed = target_profit
            .checked_sub(current_profit)
            .and_then(|rest| rest.checked_div(potential_win_per_bet))
            .ok_or_else(|| too_large("Wins needed"))?
            .ceil();
        (needed.to_i64().unwrap_or(i64::MAX).max(0), false)
    };

    Ok(WeeklyStats {
        target_profit,
        current_profit,
        stake_amount,
        potential_win_per_bet,
        wins_needed,
        remaining_bets: plan.target_bets.saturating_sub(plan.bets_placed).max(0),
        wins_needed_clamped,
    })
}

/// Plan for `week` of the current month (or this week when `None`), with
/// derived stats. A missing plan is synthesized from defaults and not saved.
pub fn get_or_default(
    conn: &Connection,
    week: Option<u32>,
    today: NaiveDate,
) -> Result<WeeklyPlanView> {
    let state = capital::require(conn)?;
    let period = state.current();
    let week = week.unwrap_or_else(|| week_of_month(today));
    validate_week(week)?;

    let (weekly_plan, persisted) = match find(conn, period, week)? {
        Some(p) => (p, true),
        None => (transient_default(conn, period, week)?, false),
    };
    let monthly_capital = month_capital(&state, period)?;
    let current_profit = week_profit(conn, period, week)?;
    let weekly_stats = compute_stats(&weekly_plan, &monthly_capital, current_profit)?;

    Ok(WeeklyPlanView {
        weekly_plan,
        persisted,
        monthly_capital,
        weekly_stats,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct PlanInput {
    pub week: Option<u32>,
    pub target_bets: i64,
    pub average_odds: Decimal,
    /// Percentage of the month's starting capital staked per bet.
    pub unit_size_percent: Decimal,
}

/// Tally the bets already stamped to (period, week).
fn existing_counts(conn: &Connection, period: Period, week: u32) -> Result<CountDelta> {
    let mut stmt = conn.prepare_cached(
        "SELECT result, COUNT(*) FROM bets WHERE month=?1 AND year=?2 AND week=?3 GROUP BY result",
    )?;
    let rows = stmt.query_map(params![period.month, period.year, week], |r| {
        Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?))
    })?;
    let mut counts = CountDelta::default();
    for row in rows {
        let (result, n) = row?;
        counts.placed += n;
        match result.parse::<BetResult>()? {
            BetResult::Win => counts.won += n,
            BetResult::Loss => counts.lost += n,
            BetResult::Pending => counts.pending += n,
        }
    }
    Ok(counts)
}

/// Upsert the plan for a week of the current month. Counters of an
/// existing plan are kept; a new plan starts from the bets already placed
/// in that week.
pub fn create_or_update(
    conn: &mut Connection,
    input: PlanInput,
    today: NaiveDate,
) -> Result<WeeklyPlan> {
    let week = input.week.unwrap_or_else(|| week_of_month(today));
    validate_week(week)?;
    if input.target_bets < 0 {
        return Err(LedgerError::invalid(format!(
            "Target bets must not be negative, got {}",
            input.target_bets
        )));
    }
    if input.average_odds < Decimal::ONE {
        return Err(LedgerError::invalid(format!(
            "Average odds must be at least 1, got {}",
            input.average_odds
        )));
    }
    let unit_size = settings::percent_to_ratio("Unit size", input.unit_size_percent)?;

    let tx = conn.transaction()?;
    let period = capital::require(&tx)?.current();
    let counts = existing_counts(&tx, period, week)?;
    tx.execute(
        "INSERT INTO weekly_plans(month, year, week, target_bets, average_odds, unit_size,
                                  bets_placed, bets_won, bets_lost, bets_pending)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT(month, year, week) DO UPDATE SET
            target_bets=excluded.target_bets,
            average_odds=excluded.average_odds,
            unit_size=excluded.unit_size",
        params![
            period.month,
            period.year,
            week,
            input.target_bets,
            input.average_odds.to_string(),
            unit_size.to_string(),
            counts.placed,
            counts.won,
            counts.lost,
            counts.pending,
        ],
    )?;
    let plan = find(&tx, period, week)?
        .ok_or_else(|| LedgerError::not_found(format!("Weekly plan {} week {}", period, week)))?;
    tx.commit()?;
    Ok(plan)
}

/// Adjust the counters of the plan for (period, week). Returns `false` when
/// no plan exists; counts are only tracked for planned weeks.
pub fn apply_bet_count_delta(
    conn: &Connection,
    period: Period,
    week: u32,
    delta: CountDelta,
) -> Result<bool> {
    if delta.is_zero() {
        return Ok(false);
    }
    let n = conn.execute(
        "UPDATE weekly_plans SET
            bets_placed = bets_placed + ?4,
            bets_won = bets_won + ?5,
            bets_lost = bets_lost + ?6,
            bets_pending = bets_pending + ?7
         WHERE month=?1 AND year=?2 AND week=?3",
        params![
            period.month,
            period.year,
            week,
            delta.placed,
            delta.won,
            delta.lost,
            delta.pending
        ],
    )?;
    if n > 0 {
        debug!(period = %period, week, ?delta, "weekly plan counters adjusted");
    }
    Ok(n > 0)
}
