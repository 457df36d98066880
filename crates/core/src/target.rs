// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Target selectors: which instances a command is sent to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const INSTANCE_IDS_KEY: &str = "InstanceIds";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("tag filter must look like key=value, got '{0}'")]
    MissingEquals(String),
    #[error("tag filter has an empty key: '{0}'")]
    EmptyKey(String),
}

/// One selector understood by the command service.
///
/// Tag selectors use the key `tag:{name}`; explicit instance lists use
/// `InstanceIds`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub key: String,
    pub values: Vec<String>,
}

impl Target {
    pub fn tag(name: &str, value: impl Into<String>) -> Self {
        Self { key: format!("tag:{name}"), values: vec![value.into()] }
    }

    pub fn instance_ids(ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { key: INSTANCE_IDS_KEY.to_string(), values: ids.into_iter().map(Into::into).collect() }
    }

    pub fn is_instance_ids(&self) -> bool {
        self.key == INSTANCE_IDS_KEY
    }

    /// Build the selector list from `tag=value` pairs and explicit ids.
    ///
    /// Tag selectors come first, one per pair; explicit ids, if any, are
    /// collected into a single trailing `InstanceIds` selector.
    pub fn from_args(tag_pairs: &[String], instance_ids: &[String]) -> Result<Vec<Target>, TargetError> {
        let mut targets = tag_pairs
            .iter()
            .map(|pair| pair.parse::<Target>())
            .collect::<Result<Vec<_>, _>>()?;
        if !instance_ids.is_empty() {
            targets.push(Target::instance_ids(instance_ids.iter().cloned()));
        }
        Ok(targets)
    }
}

impl FromStr for Target {
    type Err = TargetError;

    /// Parse a `tag=value` pair; the value may itself contain `=`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tag, value) = s.split_once('=').ok_or_else(|| TargetError::MissingEquals(s.to_string()))?;
        if tag.is_empty() {
            return Err(TargetError::EmptyKey(s.to_string()));
        }
        Ok(Target::tag(tag, value))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.values.join(","))
    }
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod tests;
