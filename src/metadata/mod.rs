//! The key-value descriptor format (`PKG-INFO` / `METADATA` files).
//!
//! A descriptor record is a block of `Key: value` header lines, with
//! repeatable keys (`Classifier`, `Provides-Extra`, `License-File`),
//! continuation lines indented with whitespace, and an optional free-text
//! description body after the first blank line.
//!
//! # Example
//!
//! ```
//! use distscan::metadata::parse_metadata;
//!
//! let record = "Name: example\nVersion: 0.1.0\nRequires-Python: >=3.8\n";
//! let descriptor = parse_metadata(record)?;
//! assert_eq!(descriptor.name, "example");
//! # Ok::<(), distscan::metadata::MetadataError>(())
//! ```

mod parse;
mod write;

pub use parse::{parse_metadata, MetadataError};
pub use write::write_metadata;
