// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Capital ledger: the singleton capital record, its month-by-month
//! schedule, and the pointer to the month currently being played.
//!
//! Every mutating operation loads the ledger, changes it in memory and
//! writes it back inside one SQLite transaction. [`apply_profit_delta`] is
//! the exception: it runs inside the caller's transaction so bet cascades
//! commit or roll back as a unit.

use crate::error::{LedgerError, Result};
use crate::models::{CapitalState, MonthEntry, Period};
use crate::projection::{self, DEFAULT_DURATION_MONTHS};
use crate::settings;
use crate::utils::read_decimal;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

pub const DEFAULT_INITIAL_CAPITAL: i64 = 5000;
pub const DEFAULT_START_MONTH: u32 = 3;
pub const DEFAULT_START_YEAR: i32 = 2025;

/// Fields accepted by [`edit_capital`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct CapitalEdit {
    pub initial_capital: Option<Decimal>,
    pub current_capital: Option<Decimal>,
    pub monthly_growth_target: Option<Decimal>,
}

#[derive(Debug, Clone, Copy)]
pub struct ScheduleUpdate {
    pub start_month: u32,
    pub start_year: i32,
    pub duration_months: u32,
}

/// Proof that the user confirmed a reset. Only obtainable through
/// [`ResetConfirmation::confirm`].
#[derive(Debug, Clone, Copy)]
pub struct ResetConfirmation(());

impl ResetConfirmation {
    pub fn confirm(confirmed: bool) -> Result<Self> {
        if confirmed {
            Ok(ResetConfirmation(()))
        } else {
            Err(LedgerError::invalid(
                "Reset discards all capital progress; pass --yes to confirm",
            ))
        }
    }
}

pub fn validate_growth_rate(rate: Decimal) -> Result<()> {
    if rate <= Decimal::ZERO || rate > Decimal::ONE {
        return Err(LedgerError::invalid(format!(
            "Monthly growth target must be in (0, 1], got {}",
            rate
        )));
    }
    Ok(())
}

fn validate_capital(field: &str, v: Decimal) -> Result<()> {
    if v < Decimal::ZERO {
        return Err(LedgerError::invalid(format!(
            "{} must not be negative, got {}",
            field, v
        )));
    }
    Ok(())
}

pub fn load(conn: &Connection) -> Result<Option<CapitalState>> {
    let head = conn
        .query_row(
            "SELECT initial_capital, current_capital, monthly_growth_target,
                    start_month, start_year, current_month, current_year
             FROM capital WHERE id=1",
            [],
            |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, u32>(3)?,
                    r.get::<_, i32>(4)?,
                    r.get::<_, u32>(5)?,
                    r.get::<_, i32>(6)?,
                ))
            },
        )
        .optional()?;
    let Some((initial, current, rate, start_month, start_year, current_month, current_year)) =
        head
    else {
        return Ok(None);
    };

    let mut stmt = conn.prepare_cached(
        "SELECT month, year, initial_capital, current_capital, target_capital
         FROM monthly_capital ORDER BY seq",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, u32>(0)?,
            r.get::<_, i32>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
        ))
    })?;
    let mut monthly_capital = Vec::new();
    for row in rows {
        let (month, year, i, c, t) = row?;
        monthly_capital.push(MonthEntry {
            month,
            year,
            initial_capital: read_decimal("monthly_capital.initial_capital", &i)?,
            current_capital: read_decimal("monthly_capital.current_capital", &c)?,
            target_capital: read_decimal("monthly_capital.target_capital", &t)?,
        });
    }

    Ok(Some(CapitalState {
        initial_capital: read_decimal("capital.initial_capital", &initial)?,
        current_capital: read_decimal("capital.current_capital", &current)?,
        monthly_growth_target: read_decimal("capital.monthly_growth_target", &rate)?,
        start_month,
        start_year,
        current_month,
        current_year,
        monthly_capital,
    }))
}

pub fn require(conn: &Connection) -> Result<CapitalState> {
    load(conn)?.ok_or_else(|| LedgerError::not_found("Capital data not found"))
}

pub(crate) fn save(conn: &Connection, state: &CapitalState) -> Result<()> {
    conn.execute(
        "INSERT INTO capital(id, initial_capital, current_capital, monthly_growth_target,
                             start_month, start_year, current_month, current_year)
         VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
            initial_capital=excluded.initial_capital,
            current_capital=excluded.current_capital,
            monthly_growth_target=excluded.monthly_growth_target,
            start_month=excluded.start_month,
            start_year=excluded.start_year,
            current_month=excluded.current_month,
            current_year=excluded.current_year,
            updated_at=datetime('now')",
        params![
            state.initial_capital.to_string(),
            state.current_capital.to_string(),
            state.monthly_growth_target.to_string(),
            state.start_month,
            state.start_year,
            state.current_month,
            state.current_year,
        ],
    )?;
    conn.execute("DELETE FROM monthly_capital", [])?;
    let mut insert = conn.prepare_cached(
        "INSERT INTO monthly_capital(seq, month, year, initial_capital, current_capital, target_capital)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for (seq, e) in state.monthly_capital.iter().enumerate() {
        insert.execute(params![
            seq as i64,
            e.month,
            e.year,
            e.initial_capital.to_string(),
            e.current_capital.to_string(),
            e.target_capital.to_string(),
        ])?;
    }
    Ok(())
}

/// Build the state a fresh install starts with.
pub fn default_state(rate: Decimal) -> Result<CapitalState> {
    let initial = Decimal::from(DEFAULT_INITIAL_CAPITAL);
    Ok(CapitalState {
        initial_capital: initial,
        current_capital: initial,
        monthly_growth_target: rate,
        start_month: DEFAULT_START_MONTH,
        start_year: DEFAULT_START_YEAR,
        current_month: DEFAULT_START_MONTH,
        current_year: DEFAULT_START_YEAR,
        monthly_capital: projection::project(
            initial,
            rate,
            DEFAULT_DURATION_MONTHS,
            DEFAULT_START_MONTH,
            DEFAULT_START_YEAR,
        )?,
    })
}

/// Load the ledger, creating it with defaults on first use. Runs inside the
/// caller's transaction.
pub(crate) fn load_or_initialize(conn: &Connection) -> Result<CapitalState> {
    if let Some(state) = load(conn)? {
        return Ok(state);
    }
    let rate = settings::get(conn)?.monthly_growth_target;
    let state = default_state(rate)?;
    save(conn, &state)?;
    info!(
        initial = %state.initial_capital,
        rate = %state.monthly_growth_target,
        "capital ledger initialized"
    );
    Ok(state)
}

pub fn get_or_initialize(conn: &mut Connection) -> Result<CapitalState> {
    let tx = conn.transaction()?;
    let state = load_or_initialize(&tx)?;
    tx.commit()?;
    Ok(state)
}

fn mutate<F>(conn: &mut Connection, f: F) -> Result<CapitalState>
where
    F: FnOnce(&mut CapitalState) -> Result<()>,
{
    let tx = conn.transaction()?;
    let mut state = require(&tx)?;
    f(&mut state)?;
    save(&tx, &state)?;
    tx.commit()?;
    Ok(state)
}

/// Replace the schedule with a fresh projection from the stored start.
/// Keeps the current pointer on an existing entry. On error the state is
/// left untouched.
pub(crate) fn regenerate(state: &mut CapitalState, months: u32) -> Result<()> {
    state.monthly_capital = projection::project(
        state.initial_capital,
        state.monthly_growth_target,
        months,
        state.start_month,
        state.start_year,
    )?;
    clamp_pointer(state);
    info!(months, rate = %state.monthly_growth_target, "capital schedule regenerated");
    Ok(())
}

/// Move the current pointer to the last scheduled month when it no longer
/// names an entry.
pub(crate) fn clamp_pointer(state: &mut CapitalState) {
    if state.current_entry().is_none() {
        if let Some(last) = state.monthly_capital.last().map(MonthEntry::period) {
            warn!(
                current = %state.current(),
                last = %last,
                "current month fell outside the regenerated schedule; moved to last month"
            );
            state.current_month = last.month;
            state.current_year = last.year;
        }
    }
}

pub fn apply_edit(state: &mut CapitalState, edit: &CapitalEdit) -> Result<()> {
    if let Some(v) = edit.initial_capital {
        validate_capital("Initial capital", v)?;
    }
    if let Some(v) = edit.current_capital {
        validate_capital("Current capital", v)?;
    }
    if let Some(r) = edit.monthly_growth_target {
        validate_growth_rate(r)?;
    }
    let mut next = state.clone();
    if let Some(v) = edit.initial_capital {
        next.initial_capital = v;
    }
    if let Some(v) = edit.current_capital {
        next.current_capital = v;
    }
    if let Some(r) = edit.monthly_growth_target {
        next.monthly_growth_target = r;
    }
    if edit.initial_capital.is_some() || edit.monthly_growth_target.is_some() {
        regenerate(&mut next, DEFAULT_DURATION_MONTHS)?;
    }
    *state = next;
    Ok(())
}

pub fn edit_capital(conn: &mut Connection, edit: CapitalEdit) -> Result<CapitalState> {
    mutate(conn, |state| apply_edit(state, &edit))
}

/// Re-base one month and roll every later month forward from it.
pub fn apply_monthly_edit(
    state: &mut CapitalState,
    period: Period,
    new_initial: Decimal,
) -> Result<()> {
    validate_capital("Monthly initial capital", new_initial)?;
    let idx = state
        .monthly_capital
        .iter()
        .position(|e| e.month == period.month && e.year == period.year)
        .ok_or_else(|| {
            LedgerError::not_found(format!("Monthly capital entry for {} not found", period))
        })?;
    let rate = state.monthly_growth_target;

    let mut schedule = state.monthly_capital.clone();
    let edited = &mut schedule[idx];
    edited.initial_capital = new_initial;
    edited.current_capital = new_initial;
    edited.target_capital = projection::target_for(new_initial, rate)?;

    for i in idx + 1..schedule.len() {
        let prev_target = schedule[i - 1].target_capital;
        let e = &mut schedule[i];
        e.initial_capital = prev_target;
        e.current_capital = prev_target;
        e.target_capital = projection::target_for(prev_target, rate)?;
    }

    state.monthly_capital = schedule;
    if period == state.current() {
        state.current_capital = new_initial;
    }
    Ok(())
}

pub fn edit_monthly_capital(
    conn: &mut Connection,
    period: Period,
    new_initial: Decimal,
) -> Result<CapitalState> {
    mutate(conn, |state| apply_monthly_edit(state, period, new_initial))
}

pub fn apply_schedule(state: &mut CapitalState, update: ScheduleUpdate) -> Result<()> {
    Period::new(update.start_month, update.start_year)?;
    projection::validate_projection(state.monthly_growth_target, update.duration_months)?;

    let mut next = state.clone();
    next.start_month = update.start_month;
    next.start_year = update.start_year;
    next.current_month = update.start_month;
    next.current_year = update.start_year;
    regenerate(&mut next, update.duration_months)?;
    next.current_capital = next
        .monthly_capital
        .first()
        .map(|e| e.initial_capital)
        .unwrap_or(next.initial_capital);
    *state = next;
    Ok(())
}

/// Regenerate from scratch with a new start and length. All recorded
/// progress and manual edits are discarded.
pub fn update_schedule(conn: &mut Connection, update: ScheduleUpdate) -> Result<CapitalState> {
    mutate(conn, |state| apply_schedule(state, update))
}

pub fn step_forward(state: &mut CapitalState) -> Result<()> {
    let next = state.current().next();
    let opening = state
        .entry(next)
        .map(|e| e.initial_capital)
        .ok_or_else(|| {
            LedgerError::not_found(format!("Next month capital entry ({}) not found", next))
        })?;
    state.current_capital = opening;
    state.current_month = next.month;
    state.current_year = next.year;
    Ok(())
}

pub fn step_back(state: &mut CapitalState) -> Result<()> {
    if state.current() == state.start() {
        return Err(LedgerError::AtBoundary(format!(
            "Already at the first month ({})",
            state.start()
        )));
    }
    let prev = state.current().prev();
    let balance = state
        .entry(prev)
        .map(|e| e.current_capital)
        .ok_or_else(|| {
            LedgerError::not_found(format!("Previous month capital entry ({}) not found", prev))
        })?;
    state.current_capital = balance;
    state.current_month = prev.month;
    state.current_year = prev.year;
    Ok(())
}

pub fn advance_month(conn: &mut Connection) -> Result<CapitalState> {
    mutate(conn, step_forward)
}

pub fn revert_month(conn: &mut Connection) -> Result<CapitalState> {
    mutate(conn, step_back)
}

pub fn apply_reset(state: &mut CapitalState) -> Result<()> {
    let months = match state.monthly_capital.len() {
        0 => DEFAULT_DURATION_MONTHS,
        n => n as u32,
    };
    let mut next = state.clone();
    next.current_month = next.start_month;
    next.current_year = next.start_year;
    regenerate(&mut next, months)?;
    next.current_capital = next.initial_capital;
    *state = next;
    Ok(())
}

pub fn reset(conn: &mut Connection, _confirmed: ResetConfirmation) -> Result<CapitalState> {
    mutate(conn, apply_reset)
}

fn add_delta(balance: Decimal, delta: Decimal) -> Result<Decimal> {
    balance.checked_add(delta).ok_or_else(|| {
        LedgerError::invalid(format!("Balance {} cannot absorb a change of {}", balance, delta))
    })
}

/// Add a realised profit (or loss) to the month a bet is stamped to.
///
/// The top-level balance only moves when `period` is the current month.
/// Must be called inside the transaction of the bet mutation driving it.
pub fn apply_profit_delta(conn: &Connection, period: Period, delta: Decimal) -> Result<()> {
    if delta.is_zero() {
        return Ok(());
    }
    let state_head: (String, u32, i32) = conn
        .query_row(
            "SELECT current_capital, current_month, current_year FROM capital WHERE id=1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .optional()?
        .ok_or_else(|| LedgerError::not_found("Capital data not found"))?;
    let (current_s, current_month, current_year) = state_head;

    if period.month == current_month && period.year == current_year {
        let current = read_decimal("capital.current_capital", &current_s)?;
        conn.execute(
            "UPDATE capital SET current_capital=?1, updated_at=datetime('now') WHERE id=1",
            params![add_delta(current, delta)?.to_string()],
        )?;
    }

    let entry: Option<String> = conn
        .query_row(
            "SELECT current_capital FROM monthly_capital WHERE month=?1 AND year=?2",
            params![period.month, period.year],
            |r| r.get(0),
        )
        .optional()?;
    match entry {
        Some(s) => {
            let v = read_decimal("monthly_capital.current_capital", &s)?;
            conn.execute(
                "UPDATE monthly_capital SET current_capital=?1 WHERE month=?2 AND year=?3",
                params![add_delta(v, delta)?.to_string(), period.month, period.year],
            )?;
            debug!(period = %period, delta = %delta, "profit delta applied");
        }
        None => {
            warn!(period = %period, delta = %delta, "no capital entry for bet period; delta skipped");
        }
    }
    Ok(())
}
