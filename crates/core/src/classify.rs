// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Partition of targeted instances into live, wrong-platform, and faulty.

use crate::id::InstanceId;
use crate::instance::InstanceDescription;
use crate::invocation::InvocationSet;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Which targeted instances are expected to report back.
///
/// The three lists are disjoint and together cover every targeted instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetClassification {
    /// Running instances whose platform matches the command's document.
    pub live: Vec<InstanceId>,
    /// Instances whose OS cannot run the command's document.
    pub wrong_platform: Vec<InstanceId>,
    /// Everything else, e.g. instances terminated before accepting the command.
    pub faulty: Vec<InstanceId>,
}

impl TargetClassification {
    /// Classify every instance in `invocations` against what the compute
    /// service reports about it.
    ///
    /// A platform mismatch wins over run state; an instance with no
    /// description, or one that is not running, is faulty.
    pub fn classify(invocations: &InvocationSet, descriptions: &[InstanceDescription]) -> Self {
        let by_id: HashMap<&str, &InstanceDescription> =
            descriptions.iter().map(|d| (d.instance_id.as_str(), d)).collect();

        let mut classification = TargetClassification::default();
        for invocation in invocations {
            let id = invocation.instance_id.clone();
            match by_id.get(invocation.instance_id.as_str()) {
                Some(desc) if !invocation.document.supports(&desc.platform) => {
                    classification.wrong_platform.push(id);
                }
                Some(desc) if desc.state.is_running() => classification.live.push(id),
                _ => classification.faulty.push(id),
            }
        }
        classification
    }

    pub fn total(&self) -> usize {
        self.live.len() + self.wrong_platform.len() + self.faulty.len()
    }

    /// Number of instances the command should hear back from.
    pub fn expected_responses(&self) -> usize {
        self.live.len()
    }

    /// Instances that will never report and must not hold up completion.
    pub fn excluded(&self) -> HashSet<InstanceId> {
        self.wrong_platform.iter().chain(&self.faulty).cloned().collect()
    }
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
