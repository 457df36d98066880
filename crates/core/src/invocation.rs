// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-instance command invocations and their status lifecycle.

use crate::document::DocumentType;
use crate::id::InstanceId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Status of one instance's invocation of a command.
///
/// Serializes as the service's PascalCase status name. Statuses the service
/// adds later land in `Other`. Anything but `InProgress` counts as complete.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InvocationStatus {
    Pending,
    InProgress,
    Delayed,
    Success,
    Cancelled,
    TimedOut,
    Failed,
    Cancelling,
    Undeliverable,
    Terminated,
    Other(String),
}

impl InvocationStatus {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Pending" => InvocationStatus::Pending,
            "InProgress" => InvocationStatus::InProgress,
            "Delayed" => InvocationStatus::Delayed,
            "Success" => InvocationStatus::Success,
            "Cancelled" => InvocationStatus::Cancelled,
            "TimedOut" => InvocationStatus::TimedOut,
            "Failed" => InvocationStatus::Failed,
            "Cancelling" => InvocationStatus::Cancelling,
            "Undeliverable" => InvocationStatus::Undeliverable,
            "Terminated" => InvocationStatus::Terminated,
            other => InvocationStatus::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            InvocationStatus::Pending => "Pending",
            InvocationStatus::InProgress => "InProgress",
            InvocationStatus::Delayed => "Delayed",
            InvocationStatus::Success => "Success",
            InvocationStatus::Cancelled => "Cancelled",
            InvocationStatus::TimedOut => "TimedOut",
            InvocationStatus::Failed => "Failed",
            InvocationStatus::Cancelling => "Cancelling",
            InvocationStatus::Undeliverable => "Undeliverable",
            InvocationStatus::Terminated => "Terminated",
            InvocationStatus::Other(name) => name,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, InvocationStatus::InProgress)
    }

    pub fn is_complete(&self) -> bool {
        !self.is_in_progress()
    }

    pub fn is_success(&self) -> bool {
        matches!(self, InvocationStatus::Success)
    }
}

impl From<String> for InvocationStatus {
    fn from(name: String) -> Self {
        InvocationStatus::from_name(&name)
    }
}

impl From<InvocationStatus> for String {
    fn from(status: InvocationStatus) -> Self {
        status.name().to_string()
    }
}

impl std::fmt::Display for InvocationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One instance's record of running a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub instance_id: InstanceId,
    pub document: DocumentType,
    pub status: InvocationStatus,
    #[serde(default)]
    pub status_details: String,
}

crate::builder! {
    pub struct InvocationBuilder => Invocation {
        into {
            instance_id: InstanceId = "i-test",
            status_details: String = "",
        }
        set {
            document: DocumentType = DocumentType::ShellScript,
            status: InvocationStatus = InvocationStatus::InProgress,
        }
    }
}

/// Invocations of one command keyed by instance.
///
/// Keys are never removed; inserting an existing instance replaces its entry
/// (the service's latest view wins). Iteration is in instance-id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationSet {
    invocations: BTreeMap<InstanceId, Invocation>,
}

impl InvocationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, invocation: Invocation) {
        self.invocations.insert(invocation.instance_id.clone(), invocation);
    }

    /// Merge a batch of invocations, overwriting prior entries.
    pub fn merge(&mut self, invocations: impl IntoIterator<Item = Invocation>) {
        for invocation in invocations {
            self.insert(invocation);
        }
    }

    pub fn get(&self, instance_id: &str) -> Option<&Invocation> {
        self.invocations.get(instance_id)
    }

    pub fn contains(&self, instance_id: &str) -> bool {
        self.invocations.contains_key(instance_id)
    }

    pub fn len(&self) -> usize {
        self.invocations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invocations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Invocation> {
        self.invocations.values()
    }

    pub fn instance_ids(&self) -> Vec<InstanceId> {
        self.invocations.keys().cloned().collect()
    }

    /// Document of the command, taken from the first invocation.
    pub fn document(&self) -> Option<&DocumentType> {
        self.iter().next().map(|inv| &inv.document)
    }

    /// True iff no invocation is `InProgress`.
    pub fn all_complete(&self) -> bool {
        self.iter().all(|inv| inv.status.is_complete())
    }

    /// Entries no longer `InProgress` that are either new since `prev` or
    /// whose status differs from `prev`'s.
    ///
    /// Covers first-seen completions and corrections between two completed
    /// statuses (e.g. TimedOut → Failed). Never repeats an unchanged entry.
    pub fn completed_since(&self, prev: &InvocationSet) -> InvocationSet {
        let invocations = self
            .invocations
            .iter()
            .filter(|(id, inv)| {
                inv.status.is_complete()
                    && prev.get(id).is_none_or(|before| before.status != inv.status)
            })
            .map(|(id, inv)| (id.clone(), inv.clone()))
            .collect();
        InvocationSet { invocations }
    }

    /// Subset whose instance is not in `excluded`.
    pub fn excluding(&self, excluded: &HashSet<InstanceId>) -> InvocationSet {
        let invocations = self
            .invocations
            .iter()
            .filter(|(id, _)| !excluded.contains(*id))
            .map(|(id, inv)| (id.clone(), inv.clone()))
            .collect();
        InvocationSet { invocations }
    }

    pub fn success_count(&self) -> usize {
        self.iter().filter(|inv| inv.status.is_success()).count()
    }
}

impl FromIterator<Invocation> for InvocationSet {
    fn from_iter<I: IntoIterator<Item = Invocation>>(iter: I) -> Self {
        let mut set = InvocationSet::new();
        set.merge(iter);
        set
    }
}

impl<'a> IntoIterator for &'a InvocationSet {
    type Item = &'a Invocation;
    type IntoIter = std::collections::btree_map::Values<'a, InstanceId, Invocation>;

    fn into_iter(self) -> Self::IntoIter {
        self.invocations.values()
    }
}

#[cfg(test)]
#[path = "invocation_tests.rs"]
mod tests;
