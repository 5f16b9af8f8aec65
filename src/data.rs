//! Report data structures and serialization helpers.

pub mod report;
pub mod yaml;

pub use report::{CheckItem, CheckResult, OutputFormat, Report};
pub use yaml::{from_yaml, read_yaml_file, to_yaml};
