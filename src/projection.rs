// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Compound growth schedule.
//!
//! Each month's target is `round(capital * (1 + rate))` and becomes the next
//! month's starting capital. Rounding happens at every step, so a projection
//! is reproducible from its inputs alone.

use crate::error::LedgerError;
use crate::models::MonthEntry;
use crate::utils::round_half_up;
use rust_decimal::Decimal;

pub const DEFAULT_DURATION_MONTHS: u32 = 36;
pub const MAX_DURATION_MONTHS: u32 = 1200;

pub fn validate_projection(rate: Decimal, months: u32) -> Result<(), LedgerError> {
    if rate <= -Decimal::ONE {
        return Err(LedgerError::invalid(format!(
            "Growth rate must be greater than -1, got {}",
            rate
        )));
    }
    if months == 0 || months > MAX_DURATION_MONTHS {
        return Err(LedgerError::invalid(format!(
            "Schedule must cover 1 to {} months, got {}",
            MAX_DURATION_MONTHS, months
        )));
    }
    Ok(())
}

fn growth_factor(rate: Decimal) -> Result<Decimal, LedgerError> {
    Decimal::ONE
        .checked_add(rate)
        .ok_or_else(|| LedgerError::invalid(format!("Growth rate {} is out of range", rate)))
}

fn grow(capital: Decimal, factor: Decimal) -> Option<Decimal> {
    capital.checked_mul(factor).map(round_half_up)
}

fn overflow(capital: Decimal, month: u32) -> LedgerError {
    LedgerError::invalid(format!(
        "Capital {} cannot be compounded past month {}; shorten the schedule or lower the rate",
        capital, month
    ))
}

/// Project `months` entries starting at `start_month`/`start_year`.
/// Callers validate `rate` and `months` first. Fails with `InvalidInput`
/// once a target no longer fits in a `Decimal`.
pub fn project(
    initial_capital: Decimal,
    rate: Decimal,
    months: u32,
    start_month: u32,
    start_year: i32,
) -> Result<Vec<MonthEntry>, LedgerError> {
    let factor = growth_factor(rate)?;
    let mut capital = initial_capital;
    let mut out = Vec::with_capacity(months.min(MAX_DURATION_MONTHS) as usize);
    for i in 0..months {
        let offset = start_month + i;
        let target = grow(capital, factor).ok_or_else(|| overflow(capital, i + 1))?;
        out.push(MonthEntry {
            month: offset % 12,
            year: start_year + (offset / 12) as i32,
            initial_capital: capital,
            current_capital: capital,
            target_capital: target,
        });
        capital = target;
    }
    Ok(out)
}

/// Month-by-month target for an entry whose starting capital changed.
pub fn target_for(initial_capital: Decimal, rate: Decimal) -> Result<Decimal, LedgerError> {
    grow(initial_capital, growth_factor(rate)?).ok_or_else(|| {
        LedgerError::invalid(format!(
            "Capital {} is too large to compound at rate {}",
            initial_capital, rate
        ))
    })
}
