//! Runnable evaluation tasks.

pub mod codesearch;

pub use codesearch::{evaluate, test, train};
