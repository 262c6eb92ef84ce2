//! Utilities shared by the cohort chat server binary and its tests.

pub mod logger;
pub mod time;
