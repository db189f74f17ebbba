// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod db;
pub mod error;
pub mod models;
pub mod utils;

pub mod projection;
pub mod capital;
pub mod settings;
pub mod weekly_plan;
pub mod bets;
pub mod stats;
pub mod summary;

pub mod commands;
