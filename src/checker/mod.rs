mod fields;
mod latest;

pub use fields::{is_valid_name, FieldChecker};
pub use latest::{is_newer, normalize_name, LatestChecker};

use crate::model::{Distribution, Finding};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait DescriptorChecker: Send + Sync {
    fn name(&self) -> &'static str;
    async fn check(&self, distributions: &[Distribution]) -> Result<Vec<Finding>>;
}

pub fn default_checker() -> FieldChecker {
    FieldChecker::new()
}

pub fn default_latest_checker() -> LatestChecker {
    LatestChecker::new()
}
