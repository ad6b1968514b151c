// src/lib.rs

//! Lottery seasons library
//!
//! Bi-weekly seasons with randomized scoring stats, point submissions from
//! authenticated players, and weighted winner draws.

pub mod clients;
pub mod config;
pub mod error;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod store;
pub mod utils;
