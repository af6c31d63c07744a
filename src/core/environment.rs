//! Static facts about the host, gathered once per handler

use serde::{Deserialize, Serialize};

/// Host identity stamped onto every record
///
/// All fields are optional; missing facts are omitted from the JSON record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentFacts {
    pub machine: Option<String>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
}

impl EnvironmentFacts {
    /// No environment fields at all
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(
        machine: impl Into<String>,
        os_name: impl Into<String>,
        os_version: impl Into<String>,
    ) -> Self {
        Self {
            machine: Some(machine.into()),
            os_name: Some(os_name.into()),
            os_version: Some(os_version.into()),
        }
    }

    /// Best-effort detection of the running host
    pub fn detect() -> Self {
        Self {
            machine: detect_machine(),
            os_name: Some(std::env::consts::OS.to_string()),
            os_version: detect_os_version(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.machine.is_none() && self.os_name.is_none() && self.os_version.is_none()
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn detect_machine() -> Option<String> {
    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok().and_then(non_empty))
        .or_else(|| {
            std::fs::read_to_string("/etc/hostname")
                .ok()
                .and_then(non_empty)
        })
}

fn detect_os_version() -> Option<String> {
    let release = std::fs::read_to_string("/etc/os-release").ok()?;
    parse_os_release_version(&release)
}

/// Extract `VERSION_ID` from an os-release document
fn parse_os_release_version(release: &str) -> Option<String> {
    release
        .lines()
        .find_map(|line| line.strip_prefix("VERSION_ID="))
        .map(|value| value.trim_matches('"').to_string())
        .and_then(non_empty)
}
