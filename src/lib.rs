// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod aggregate;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod dialog;
pub mod error;
pub mod ledger;
pub mod log;
pub mod models;
pub mod quotes;
pub mod rates;
pub mod utils;
