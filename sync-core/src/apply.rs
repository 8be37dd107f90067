//! How a plan is applied to the remote.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Ordering of the remote calls and the state write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyMode {
    /// Upload and delete concurrently, then persist only what the remote
    /// confirmed.
    #[default]
    Safe,
    /// Upload, delete and write the scanned state all at once. The state
    /// may claim changes the remote never received if a call fails.
    Fast,
}

impl FromStr for ApplyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "safe" => Ok(Self::Safe),
            "fast" => Ok(Self::Fast),
            other => Err(format!("unknown apply mode `{other}` (expected `safe` or `fast`)")),
        }
    }
}

impl fmt::Display for ApplyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Safe => "safe",
            Self::Fast => "fast",
        })
    }
}
