use serde::{Deserialize, Serialize};

/// Id of the single agent this service hosts.
pub const DEFAULT_AGENT_ID: &str = "default";

/// How the agent presents itself to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentProfile {
    pub name: String,
    pub instructions: Vec<String>,
    /// Previous exchanges (user + assistant pairs) fed back as context.
    pub history_runs: usize,
    pub markdown: bool,
    pub add_datetime: bool,
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self {
            name: "VBoarder".to_string(),
            instructions: vec![
                "You are a full-stack assistant focused on precision and clarity.".to_string(),
                "Cite sources when using retrieved knowledge.".to_string(),
                "If errors occur, explain them clearly and suggest fixes.".to_string(),
            ],
            history_runs: 5,
            markdown: true,
            add_datetime: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Ready,
    Error,
}

/// Public metadata returned by `/agents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInfo {
    pub id: String,
    pub name: String,
    pub model: String,
    pub status: AgentStatus,
}

impl AgentInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>, ready: bool) -> Self {
        Self {
            id: DEFAULT_AGENT_ID.to_string(),
            name: name.into(),
            model: model.into(),
            status: if ready {
                AgentStatus::Ready
            } else {
                AgentStatus::Error
            },
        }
    }
}
