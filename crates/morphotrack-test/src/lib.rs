//! morphotrack-test - Regression test harness for morphotrack
//!
//! Provides [`RegParams`], which runs a sequence of numbered comparisons
//! and reports every failure at the end, and [`fixtures`] for building
//! synthetic masks, label volumes and intensity frames.
//!
//! # Usage
//!
//! ```
//! use morphotrack_test::{RegParams, fixtures};
//!
//! let mut rp = RegParams::new("doc");
//! let mask = fixtures::mask_from_rows(&["##.", "##."]).unwrap();
//! rp.compare_values(4.0, mask.count_foreground() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: set to "display" to print volumes under comparison

mod error;
pub mod fixtures;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};
