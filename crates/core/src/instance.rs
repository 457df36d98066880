// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! What the compute service reports about a targeted instance.

use crate::id::InstanceId;
use serde::{Deserialize, Serialize};

/// Operating-system family of an instance.
///
/// The service only reports a platform for Windows instances; an absent
/// platform means Linux.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Windows,
    Other(String),
}

impl Platform {
    pub fn from_reported(platform: Option<&str>) -> Self {
        match platform {
            None => Platform::Linux,
            Some(p) if p.eq_ignore_ascii_case("windows") => Platform::Windows,
            Some(p) if p.eq_ignore_ascii_case("linux") => Platform::Linux,
            Some(p) => Platform::Other(p.to_string()),
        }
    }
}

/// Lifecycle state of an instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstanceState {
    Pending,
    Running,
    ShuttingDown,
    Terminated,
    Stopping,
    Stopped,
    Other(String),
}

impl InstanceState {
    pub fn from_name(name: &str) -> Self {
        match name {
            "pending" => InstanceState::Pending,
            "running" => InstanceState::Running,
            "shutting-down" => InstanceState::ShuttingDown,
            "terminated" => InstanceState::Terminated,
            "stopping" => InstanceState::Stopping,
            "stopped" => InstanceState::Stopped,
            other => InstanceState::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            InstanceState::Pending => "pending",
            InstanceState::Running => "running",
            InstanceState::ShuttingDown => "shutting-down",
            InstanceState::Terminated => "terminated",
            InstanceState::Stopping => "stopping",
            InstanceState::Stopped => "stopped",
            InstanceState::Other(name) => name,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, InstanceState::Running)
    }
}

impl From<String> for InstanceState {
    fn from(name: String) -> Self {
        InstanceState::from_name(&name)
    }
}

impl From<InstanceState> for String {
    fn from(state: InstanceState) -> Self {
        state.name().to_string()
    }
}

impl std::fmt::Display for InstanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One instance as described by the compute service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDescription {
    pub instance_id: InstanceId,
    pub platform: Platform,
    pub state: InstanceState,
}

impl InstanceDescription {
    pub fn new(instance_id: impl Into<InstanceId>, platform: Platform, state: InstanceState) -> Self {
        Self { instance_id: instance_id.into(), platform, state }
    }
}

#[cfg(test)]
#[path = "instance_tests.rs"]
mod tests;
