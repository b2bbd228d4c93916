pub mod featuresets;
pub mod models;

pub use featuresets::FeatureSetClient;
pub use models::ModelClient;

use crate::error::{LtrError, Result};

// Only argument check done client-side: required names must be non-empty.
fn require(value: &str, name: &'static str) -> Result<()> {
    if value.is_empty() {
        return Err(LtrError::MissingArgument(name));
    }
    Ok(())
}
