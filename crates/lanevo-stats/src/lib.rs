//! Summary statistics for per-generation training reports.
//!
//! - [`descriptive`]: min, max, mean, median and spread of a sample
//!
//! # Example
//!
//! ```
//! use lanevo_stats::descriptive::DescriptiveStats;
//!
//! let stats = DescriptiveStats::new([0.1, 0.3, 0.6]).unwrap();
//! assert_eq!(stats.max, 0.6);
//! assert_eq!(stats.median, 0.3);
//! ```

pub mod descriptive;
