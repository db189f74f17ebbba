// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::capital;
use crate::error::{LedgerError, Result};
use crate::models::CapitalState;
use crate::projection::{self, DEFAULT_DURATION_MONTHS};
use crate::utils::{get_setting, read_decimal, set_setting};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

const GROWTH_KEY: &str = "monthly_growth_target";
const UNIT_SIZE_KEY: &str = "default_unit_size";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub monthly_growth_target: Decimal,
    pub default_unit_size: Decimal,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            monthly_growth_target: Decimal::new(2, 1),
            default_unit_size: Decimal::new(5, 2),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsUpdate {
    pub settings: Settings,
    pub growth_rate_changed: bool,
    pub capital: Option<CapitalState>,
}

pub fn get(conn: &Connection) -> Result<Settings> {
    let defaults = Settings::default();
    let monthly_growth_target = match get_setting(conn, GROWTH_KEY)? {
        Some(s) => read_decimal("settings.monthly_growth_target", &s)?,
        None => defaults.monthly_growth_target,
    };
    let default_unit_size = match get_setting(conn, UNIT_SIZE_KEY)? {
        Some(s) => read_decimal("settings.default_unit_size", &s)?,
        None => defaults.default_unit_size,
    };
    Ok(Settings {
        monthly_growth_target,
        default_unit_size,
    })
}

/// Convert a percentage in (0, 100] to a ratio.
pub fn percent_to_ratio(field: &str, percent: Decimal) -> Result<Decimal> {
    if percent <= Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
        return Err(LedgerError::invalid(format!(
            "{} must be a percentage in (0, 100], got {}",
            field, percent
        )));
    }
    Ok(percent / Decimal::ONE_HUNDRED)
}

/// Re-project the schedule at a new rate, keeping whatever balance each
/// already-scheduled month has accumulated. The current pointer is moved to
/// the last month if the shorter schedule no longer contains it.
pub fn apply_growth_change(state: &mut CapitalState, rate: Decimal) -> Result<()> {
    let projected = projection::project(
        state.initial_capital,
        rate,
        DEFAULT_DURATION_MONTHS,
        state.start_month,
        state.start_year,
    )?;
    let previous = std::mem::take(&mut state.monthly_capital);
    state.monthly_growth_target = rate;
    state.monthly_capital = projected
        .into_iter()
        .map(|mut e| {
            if let Some(old) = previous
                .iter()
                .find(|o| o.month == e.month && o.year == e.year)
            {
                e.current_capital = old.current_capital;
            }
            e
        })
        .collect();
    capital::clamp_pointer(state);
    info!(rate = %rate, "schedule re-projected after growth target change");
    Ok(())
}

pub fn update(
    conn: &mut Connection,
    growth_percent: Decimal,
    unit_size_percent: Decimal,
) -> Result<SettingsUpdate> {
    let rate = percent_to_ratio("Monthly growth target", growth_percent)?;
    let unit_size = percent_to_ratio("Default unit size", unit_size_percent)?;

    let tx = conn.transaction()?;
    let before = get(&tx)?;
    let growth_rate_changed = before.monthly_growth_target != rate;
    set_setting(&tx, GROWTH_KEY, &rate.to_string())?;
    set_setting(&tx, UNIT_SIZE_KEY, &unit_size.to_string())?;

    let mut capital_state = None;
    if growth_rate_changed {
        if let Some(mut state) = capital::load(&tx)? {
            apply_growth_change(&mut state, rate)?;
            capital::save(&tx, &state)?;
            capital_state = Some(state);
        }
    }
    tx.commit()?;

    Ok(SettingsUpdate {
        settings: Settings {
            monthly_growth_target: rate,
            default_unit_size: unit_size,
        },
        growth_rate_changed,
        capital: capital_state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::models::Period;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn defaults_when_unset() {
        let conn = setup();
        let s = get(&conn).unwrap();
        assert_eq!(s.monthly_growth_target, d("0.2"));
        assert_eq!(s.default_unit_size, d("0.05"));
    }

    #[test]
    fn update_stores_ratios() {
        let mut conn = setup();
        let out = update(&mut conn, d("20"), d("2.5")).unwrap();
        assert!(!out.growth_rate_changed);
        assert!(out.capital.is_none());
        assert_eq!(get(&conn).unwrap().default_unit_size, d("0.025"));
    }

    #[test]
    fn rejects_out_of_range_percent() {
        let mut conn = setup();
        assert!(update(&mut conn, d("0"), d("5")).is_err());
        assert!(update(&mut conn, d("20"), d("101")).is_err());
    }

    #[test]
    fn growth_change_preserves_recorded_balances() {
        let mut conn = setup();
        capital::get_or_initialize(&mut conn).unwrap();
        capital::apply_profit_delta(&conn, Period::new(3, 2025).unwrap(), d("300")).unwrap();

        let out = update(&mut conn, d("10"), d("5")).unwrap();
        assert!(out.growth_rate_changed);
        let state = capital::require(&conn).unwrap();
        assert_eq!(state.monthly_growth_target, d("0.1"));
        assert_eq!(state.monthly_capital[0].target_capital, d("5500"));
        assert_eq!(state.monthly_capital[0].current_capital, d("5300"));
        assert_eq!(state.monthly_capital[1].initial_capital, d("5500"));
        // untouched months keep the old projection's balance
        assert_eq!(state.monthly_capital[1].current_capital, d("6000"));
    }

    #[test]
    fn growth_change_pulls_pointer_back_into_schedule() {
        let mut conn = setup();
        capital::get_or_initialize(&mut conn).unwrap();
        capital::update_schedule(
            &mut conn,
            capital::ScheduleUpdate {
                start_month: 3,
                start_year: 2025,
                duration_months: 48,
            },
        )
        .unwrap();
        for _ in 0..40 {
            capital::advance_month(&mut conn).unwrap();
        }
        assert_eq!(
            capital::require(&conn).unwrap().current(),
            Period::new(7, 2028).unwrap()
        );

        update(&mut conn, d("10"), d("5")).unwrap();
        let state = capital::require(&conn).unwrap();
        assert_eq!(state.monthly_capital.len(), 36);
        assert_eq!(state.current(), Period::new(2, 2028).unwrap());
        assert!(state.current_entry().is_some());

        let err = capital::advance_month(&mut conn).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
        let back = capital::revert_month(&mut conn).unwrap();
        assert_eq!(back.current(), Period::new(1, 2028).unwrap());
    }

    #[test]
    fn new_ledgers_pick_up_configured_growth() {
        let mut conn = setup();
        update(&mut conn, d("10"), d("5")).unwrap();
        let state = capital::get_or_initialize(&mut conn).unwrap();
        assert_eq!(state.monthly_capital[0].target_capital, d("5500"));
    }
}
