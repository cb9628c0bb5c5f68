//! Remote capability table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a capability reports completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMode {
    /// Trigger returns `{jobId, status}`; completion is observed by polling.
    Polled,
    /// Trigger blocks until the work is done and returns the final payload.
    Inline,
}

/// A remote compute capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Video deblur / enhancement
    Enhance,
    /// Face swap
    Swap,
    /// Face tracking
    Track,
    /// Text/image to video generation
    Generate,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::Enhance,
        Capability::Swap,
        Capability::Track,
        Capability::Generate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Enhance => "enhance",
            Capability::Swap => "swap",
            Capability::Track => "track",
            Capability::Generate => "generate",
        }
    }

    /// Path of the endpoint that starts the work.
    pub fn trigger_path(&self) -> &'static str {
        match self {
            Capability::Enhance => "/enhance",
            Capability::Swap => "/swap",
            Capability::Track => "/detect-faces",
            Capability::Generate => "/generate",
        }
    }

    pub fn progress_mode(&self) -> ProgressMode {
        match self {
            Capability::Enhance | Capability::Generate => ProgressMode::Polled,
            Capability::Swap | Capability::Track => ProgressMode::Inline,
        }
    }

    /// Path of the progress endpoint, for polled capabilities.
    pub fn progress_path(&self, job_id: &str) -> Option<String> {
        match self.progress_mode() {
            ProgressMode::Polled => Some(format!("/progress/{}", job_id)),
            ProgressMode::Inline => None,
        }
    }

    /// Whether the trigger body expects a `job_id` field.
    pub fn sends_job_id(&self) -> bool {
        matches!(self.progress_mode(), ProgressMode::Polled)
    }

    /// Environment variable holding the service base URL.
    pub fn url_env(&self) -> &'static str {
        match self {
            Capability::Enhance => "DEBLUR_SERVICE_URL",
            Capability::Swap | Capability::Track => "MORPH_SERVICE_URL",
            Capability::Generate => "WAN_SERVICE_URL",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Capability::Enhance => "http://localhost:8002",
            Capability::Swap | Capability::Track => "http://localhost:8000",
            Capability::Generate => "http://localhost:8003",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown capability: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_table() {
        assert_eq!(Capability::Track.trigger_path(), "/detect-faces");
        assert_eq!(
            Capability::Enhance.progress_path("j1").as_deref(),
            Some("/progress/j1")
        );
        assert!(Capability::Swap.progress_path("j1").is_none());
        assert_eq!(Capability::Swap.url_env(), Capability::Track.url_env());
    }

    #[test]
    fn test_capability_parse() {
        assert_eq!("generate".parse::<Capability>().unwrap(), Capability::Generate);
        assert!("upscale".parse::<Capability>().is_err());
    }
}
