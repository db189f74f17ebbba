// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::bets::{self, BetFilter};
use crate::error::Result;
use crate::models::{Bet, BetResult};
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryStats {
    pub bets: usize,
    pub wins: usize,
    pub losses: usize,
    pub profit: Decimal,
    pub win_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BetStats {
    pub total_bets: usize,
    pub wins: usize,
    pub losses: usize,
    pub pending: usize,
    pub total_profit: Decimal,
    /// Stake of settled bets only.
    pub total_stake: Decimal,
    pub win_rate: f64,
    pub roi: f64,
    pub average_odds: Decimal,
    pub league_stats: BTreeMap<String, CategoryStats>,
    pub bet_type_stats: BTreeMap<String, CategoryStats>,
}

fn win_rate(wins: usize, losses: usize) -> f64 {
    match wins + losses {
        0 => 0.0,
        n => wins as f64 / n as f64 * 100.0,
    }
}

fn ratio_pct(num: Decimal, den: Decimal) -> f64 {
    if den.is_zero() {
        return 0.0;
    }
    num.checked_div(den)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .and_then(|r| r.to_f64())
        .unwrap_or(0.0)
}

impl CategoryStats {
    fn push(&mut self, bet: &Bet) {
        self.bets += 1;
        match bet.result {
            BetResult::Win => self.wins += 1,
            BetResult::Loss => self.losses += 1,
            BetResult::Pending => {}
        }
        self.profit = self.profit.saturating_add(bet.profit);
        self.win_rate = win_rate(self.wins, self.losses);
    }
}

/// Aggregate a set of bets.
pub fn summarize(bets: &[Bet]) -> BetStats {
    let mut s = BetStats {
        total_bets: bets.len(),
        ..Default::default()
    };
    let mut odds_sum = Decimal::ZERO;
    for bet in bets {
        match bet.result {
            BetResult::Win => s.wins += 1,
            BetResult::Loss => s.losses += 1,
            BetResult::Pending => s.pending += 1,
        }
        s.total_profit = s.total_profit.saturating_add(bet.profit);
        if bet.result.is_settled() {
            s.total_stake = s.total_stake.saturating_add(bet.stake);
            odds_sum = odds_sum.saturating_add(bet.odds);
        }
        s.league_stats
            .entry(bet.league.clone())
            .or_default()
            .push(bet);
        s.bet_type_stats
            .entry(bet.bet_type.as_str().to_string())
            .or_default()
            .push(bet);
    }
    let settled = s.wins + s.losses;
    if settled > 0 {
        s.average_odds = odds_sum / Decimal::from(settled as u64);
    }
    s.win_rate = win_rate(s.wins, s.losses);
    s.roi = ratio_pct(s.total_profit, s.total_stake);
    s
}

pub fn bet_stats(conn: &Connection, filter: &BetFilter) -> Result<BetStats> {
    let matched = bets::matching(conn, filter)?;
    Ok(summarize(&matched))
}
