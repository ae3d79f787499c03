//! Core domain types and logic.

pub mod bar;
pub mod history;
pub mod indicator;
pub mod crossover;
pub mod sizing;
pub mod strategy;
pub mod position;
pub mod portfolio;
pub mod backtest;
pub mod metrics;
pub mod config;
pub mod config_validation;
pub mod error;
