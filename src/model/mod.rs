//! Core data types for descriptors, findings, and scan reports.
//!
//! This module contains the fundamental types used throughout distscan:
//!
//! - [`Descriptor`] - A parsed package-descriptor record
//! - [`Distribution`] - A descriptor plus where it was found
//! - [`Source`] - The on-disk layout a descriptor came from
//! - [`Platform`] - Operating system platform
//! - [`Finding`] - A validation result
//! - [`ScanReport`] - Complete scan results
//!
//! # Example
//!
//! ```
//! use distscan::model::{Descriptor, Distribution, ScanReport, Source};
//! use distscan::Version;
//!
//! let descriptor = Descriptor::new("variantconvert", Version::parse("1.0.0").unwrap());
//! let dist = Distribution::new(descriptor, Source::DistInfo);
//! let report = ScanReport::new(vec![dist]);
//!
//! println!("Scanned {} distributions", report.distributions.len());
//! ```

mod descriptor;
mod report;

pub use descriptor::*;
pub use report::*;
