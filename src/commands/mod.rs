// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod bets;
pub mod capital;
pub mod doctor;
pub mod exporter;
pub mod plans;
pub mod settings;
pub mod stats;
