// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Month-level rollups over the current period.

use crate::bets::BetFilter;
use crate::capital;
use crate::error::{LedgerError, Result};
use crate::models::Period;
use crate::stats;
use crate::utils::round_half_up;
use crate::weekly_plan;
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekRow {
    pub week: u32,
    pub bets: i64,
    pub wins: usize,
    pub losses: usize,
    pub profit: Decimal,
    pub roi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotals {
    pub wins: usize,
    pub losses: usize,
    pub profit: Decimal,
    /// Unweighted mean of the weekly ROIs.
    pub roi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub month: u32,
    pub year: i32,
    pub weeks: Vec<WeekRow>,
    pub totals: MonthTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapitalOverview {
    pub month: u32,
    pub year: i32,
    pub initial_capital: Decimal,
    pub current_capital: Decimal,
    pub target_capital: Decimal,
    pub profit_loss: Decimal,
    pub progress: i64,
}

pub fn monthly_summary(conn: &Connection) -> Result<MonthlySummary> {
    let period = capital::require(conn)?.current();
    let plans = weekly_plan::list_for_period(conn, period)?;

    let mut weeks = Vec::with_capacity(plans.len());
    for plan in &plans {
        let s = stats::bet_stats(conn, &BetFilter::for_week(period, plan.week))?;
        weeks.push(WeekRow {
            week: plan.week,
            bets: plan.bets_placed,
            wins: s.wins,
            losses: s.losses,
            profit: s.total_profit,
            roi: s.roi,
        });
    }

    let totals = MonthTotals {
        wins: weeks.iter().map(|w| w.wins).sum(),
        losses: weeks.iter().map(|w| w.losses).sum(),
        profit: weeks
            .iter()
            .fold(Decimal::ZERO, |acc, w| acc.saturating_add(w.profit)),
        roi: if weeks.is_empty() {
            0.0
        } else {
            weeks.iter().map(|w| w.roi).sum::<f64>() / weeks.len() as f64
        },
    };

    Ok(MonthlySummary {
        month: period.month,
        year: period.year,
        weeks,
        totals,
    })
}

/// Share of the month's growth target reached, capped at 100. Negative when
/// the month is under water.
pub fn progress(initial: Decimal, current: Decimal, target: Decimal) -> i64 {
    let Some(goal) = target.checked_sub(initial).filter(|g| !g.is_zero()) else {
        return 0;
    };
    let Some(gained) = current.checked_sub(initial) else {
        return 0;
    };
    match gained
        .checked_div(goal)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
    {
        Some(pct) => round_half_up(pct).to_i64().unwrap_or(0).min(100),
        None if gained.is_sign_negative() != goal.is_sign_negative() => i64::MIN,
        None => 100,
    }
}

pub fn capital_overview(conn: &Connection) -> Result<CapitalOverview> {
    let state = capital::require(conn)?;
    let period: Period = state.current();
    let m = weekly_plan::month_capital(&state, period)?;
    let profit_loss = m
        .current_capital
        .checked_sub(m.initial_capital)
        .ok_or_else(|| LedgerError::invalid("Profit/loss for the month is too large"))?;
    Ok(CapitalOverview {
        month: period.month,
        year: period.year,
        initial_capital: m.initial_capital,
        current_capital: m.current_capital,
        target_capital: m.target_capital,
        profit_loss,
        progress: progress(m.initial_capital, m.current_capital, m.target_capital),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bets::{self, NewBet};
    use crate::db::init_schema;
    use crate::models::{BetResult, BetType};
    use crate::weekly_plan::PlanInput;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn progress_caps_and_handles_flat_target() {
        assert_eq!(progress(d("5000"), d("5500"), d("6000")), 50);
        assert_eq!(progress(d("5000"), d("7000"), d("6000")), 100);
        assert_eq!(progress(d("5000"), d("4750"), d("6000")), -25);
        assert_eq!(progress(d("5000"), d("5100"), d("5000")), 0);
        assert_eq!(progress(Decimal::MIN, Decimal::MAX, d("0")), 0);
        assert_eq!(progress(d("0"), Decimal::MAX, d("0.0000001")), 100);
    }

    #[test]
    fn summary_rolls_up_weeks() {
        let mut conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        capital::get_or_initialize(&mut conn).unwrap();
        let wk1 = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let wk2 = NaiveDate::from_ymd_opt(2025, 4, 9).unwrap();
        for day in [wk1, wk2] {
            weekly_plan::create_or_update(
                &mut conn,
                PlanInput {
                    week: None,
                    target_bets: 5,
                    average_odds: d("1.8"),
                    unit_size_percent: d("5"),
                },
                day,
            )
            .unwrap();
        }
        let place = |conn: &mut Connection, result, today| {
            bets::create(
                conn,
                NewBet {
                    match_name: "A v B".into(),
                    league: "EPL".into(),
                    date: today,
                    odds: d("2"),
                    stake: d("100"),
                    bet_type: BetType::Win,
                    result,
                    notes: None,
                },
                today,
            )
            .unwrap();
        };
        place(&mut conn, BetResult::Win, wk1);
        place(&mut conn, BetResult::Loss, wk2);
        place(&mut conn, BetResult::Loss, wk2);

        let s = monthly_summary(&conn).unwrap();
        assert_eq!(s.weeks.len(), 2);
        assert_eq!(s.weeks[0].week, 1);
        assert_eq!(s.weeks[0].roi, 100.0);
        assert_eq!(s.weeks[1].bets, 2);
        assert_eq!(s.weeks[1].roi, -100.0);
        assert_eq!(s.totals.profit, d("-100"));
        assert_eq!((s.totals.wins, s.totals.losses), (1, 2));
        assert_eq!(s.totals.roi, 0.0);

        let o = capital_overview(&conn).unwrap();
        assert_eq!(o.profit_loss, d("-100"));
        assert_eq!(o.progress, -10);
    }
}
