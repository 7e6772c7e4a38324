//! Report data engine and export pipeline for dealer order books.
//!
//! The core is a set of pure derivations over externally supplied order
//! collections: [`filter`] narrows, [`aggregate`] reduces to KPIs and
//! time buckets, [`table`] owns the search/sort/page/expansion state of a
//! view, and [`export`] serializes any projected collection to CSV,
//! spreadsheet, or PDF. [`report`] composes them behind the state the UI
//! mutates; [`cli`] is the thin console front end.

pub mod aggregate;
pub mod cli;
pub mod dates;
pub mod db;
pub mod error;
pub mod export;
pub mod filter;
pub mod fmt;
pub mod models;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod record;
pub mod report;
pub mod settings;
pub mod table;
