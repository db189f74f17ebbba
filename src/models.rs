// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::LedgerError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar month. `month` is zero-based (0 = January).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(month: u32, year: i32) -> Result<Self, LedgerError> {
        if month > 11 {
            return Err(LedgerError::invalid(format!(
                "Month index must be 0..=11, got {}",
                month
            )));
        }
        Ok(Period { year, month })
    }

    pub fn next(self) -> Period {
        if self.month == 11 {
            Period {
                year: self.year + 1,
                month: 0,
            }
        } else {
            Period {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(self) -> Period {
        if self.month == 0 {
            Period {
                year: self.year - 1,
                month: 11,
            }
        } else {
            Period {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// `YYYY-MM` label with a one-based month.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month + 1)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthEntry {
    pub month: u32,
    pub year: i32,
    pub initial_capital: Decimal,
    pub current_capital: Decimal,
    pub target_capital: Decimal,
}

impl MonthEntry {
    pub fn period(&self) -> Period {
        Period {
            year: self.year,
            month: self.month,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalState {
    pub initial_capital: Decimal,
    pub current_capital: Decimal,
    pub monthly_growth_target: Decimal,
    pub start_month: u32,
    pub start_year: i32,
    pub current_month: u32,
    pub current_year: i32,
    pub monthly_capital: Vec<MonthEntry>,
}

impl CapitalState {
    pub fn start(&self) -> Period {
        Period {
            year: self.start_year,
            month: self.start_month,
        }
    }

    pub fn current(&self) -> Period {
        Period {
            year: self.current_year,
            month: self.current_month,
        }
    }

    pub fn entry(&self, period: Period) -> Option<&MonthEntry> {
        self.monthly_capital
            .iter()
            .find(|e| e.month == period.month && e.year == period.year)
    }

    pub fn current_entry(&self) -> Option<&MonthEntry> {
        self.entry(self.current())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyPlan {
    pub month: u32,
    pub year: i32,
    pub week: u32,
    pub target_bets: i64,
    pub average_odds: Decimal,
    pub unit_size: Decimal,
    pub bets_placed: i64,
    pub bets_won: i64,
    pub bets_lost: i64,
    pub bets_pending: i64,
}

impl WeeklyPlan {
    pub fn counters_balanced(&self) -> bool {
        self.bets_placed == self.bets_won + self.bets_lost + self.bets_pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BetType {
    Win,
    Draw,
    Over,
    Under,
    #[serde(rename = "BTTS")]
    Btts,
    Other,
}

impl BetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetType::Win => "Win",
            BetType::Draw => "Draw",
            BetType::Over => "Over",
            BetType::Under => "Under",
            BetType::Btts => "BTTS",
            BetType::Other => "Other",
        }
    }
}

impl FromStr for BetType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "win" => Ok(BetType::Win),
            "draw" => Ok(BetType::Draw),
            "over" => Ok(BetType::Over),
            "under" => Ok(BetType::Under),
            "btts" => Ok(BetType::Btts),
            "other" => Ok(BetType::Other),
            _ => Err(LedgerError::invalid(format!(
                "Unknown bet type '{}' (use Win|Draw|Over|Under|BTTS|Other)",
                s
            ))),
        }
    }
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetResult {
    Win,
    Loss,
    Pending,
}

impl BetResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetResult::Win => "Win",
            BetResult::Loss => "Loss",
            BetResult::Pending => "Pending",
        }
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self, BetResult::Pending)
    }
}

impl FromStr for BetResult {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "win" => Ok(BetResult::Win),
            "loss" => Ok(BetResult::Loss),
            "pending" => Ok(BetResult::Pending),
            _ => Err(LedgerError::invalid(format!(
                "Unknown result '{}' (use Win|Loss|Pending)",
                s
            ))),
        }
    }
}

impl fmt::Display for BetResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    pub id: i64,
    pub match_name: String,
    pub league: String,
    pub date: NaiveDate,
    pub odds: Decimal,
    pub stake: Decimal,
    pub bet_type: BetType,
    pub result: BetResult,
    pub profit: Decimal,
    pub notes: Option<String>,
    pub month: u32,
    pub year: i32,
    pub week: u32,
}

impl Bet {
    pub fn period(&self) -> Period {
        Period {
            year: self.year,
            month: self.month,
        }
    }
}
