//! AssetLens Core — ticker domain types and price acquisition.
//!
//! This crate holds everything up to and including alignment:
//! - Domain types (tickers, validated price series, the per-request dataset)
//! - Provider traits plus Yahoo Finance, CSV and synthetic providers
//! - Ingest (price-field selection, cleaning) and parallel acquisition
//! - Alignment policies
//!
//! Statistics, correlation and reporting live in `assetlens-runner`.

pub mod data;
pub mod domain;
