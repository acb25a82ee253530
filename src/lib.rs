//! AidScope Library
//!
//! Clients for the public data behind financial-aid decisions: College
//! Scorecard school records, FRED economic series, and U.S. Treasury rates.
//! Each client normalizes its upstream JSON and keeps its own time-boxed cache.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
