use std::borrow::Cow;

use serde::Deserialize;

/// Server platform descriptor reported on connect.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Platform {
    #[serde(rename = "Name")]
    pub name: String,
}

/// One running container as listed by `docker ps --format '{{json .}}'`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContainerSummary {
    #[serde(rename = "ID")]
    pub id: String,
    /// Comma-separated when a container carries more than one name.
    #[serde(rename = "Names")]
    pub names: String,
    #[serde(rename = "Image")]
    pub image: String,
    #[serde(rename = "State")]
    pub state: String,
}

impl ContainerSummary {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names
            .split(',')
            .map(|n| n.trim().trim_start_matches('/'))
            .filter(|n| !n.is_empty())
    }

    /// Exact name match. No prefix or id matching.
    pub fn has_name(&self, name: &str) -> bool {
        self.names().any(|n| n == name)
    }
}

/// Result of a command executed inside a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub exit_code: i32,
    /// Combined stdout and stderr, in arrival order.
    pub output: Vec<u8>,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.output)
    }
}
