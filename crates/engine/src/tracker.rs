// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Invocation tracking for one command.
//!
//! The tracker owns the command's `InvocationSet` and refreshes it from the
//! service. A refresh only lands once every page has been fetched, so a
//! pagination failure leaves the previous complete view in place.

use fr_adapters::{CommandService, CommandServiceError};
use fr_core::{CommandId, InstanceDescription, InvocationSet, TargetClassification};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("listing invocations of {command_id} failed: {source}")]
    ListInvocations {
        command_id: CommandId,
        #[source]
        source: CommandServiceError,
    },
    #[error("describing instances failed: {0}")]
    DescribeInstances(#[source] CommandServiceError),
}

pub struct InvocationTracker<S: CommandService> {
    service: S,
    command_id: CommandId,
    invocations: InvocationSet,
}

impl<S: CommandService> InvocationTracker<S> {
    pub fn new(service: S, command_id: CommandId) -> Self {
        Self { service, command_id, invocations: InvocationSet::new() }
    }

    pub fn command_id(&self) -> &CommandId {
        &self.command_id
    }

    /// The last complete view of the command's invocations.
    pub fn invocations(&self) -> &InvocationSet {
        &self.invocations
    }

    /// Fetch every page of invocations and merge them into the current set.
    ///
    /// Returns a snapshot of the merged set. On error the current set is
    /// left untouched.
    pub async fn refresh(&mut self) -> Result<InvocationSet, TrackerError> {
        let mut fetched = Vec::new();
        let mut next_token = None;
        loop {
            let page = self
                .service
                .list_invocations(&self.command_id, next_token)
                .await
                .map_err(|source| TrackerError::ListInvocations {
                    command_id: self.command_id.clone(),
                    source,
                })?;
            fetched.extend(page.invocations);
            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        tracing::debug!(
            command_id = %self.command_id,
            fetched = fetched.len(),
            "refreshed invocations"
        );
        self.invocations.merge(fetched);
        Ok(self.invocations.clone())
    }

    /// Describe every known instance and classify it against its invocation.
    pub async fn classify_targets(&self) -> Result<TargetClassification, TrackerError> {
        let instance_ids = self.invocations.instance_ids();
        let mut descriptions: Vec<InstanceDescription> = Vec::new();
        if !instance_ids.is_empty() {
            let mut next_token = None;
            loop {
                let page = self
                    .service
                    .describe_instances(&instance_ids, next_token)
                    .await
                    .map_err(TrackerError::DescribeInstances)?;
                descriptions.extend(page.instances);
                match page.next_token {
                    Some(token) => next_token = Some(token),
                    None => break,
                }
            }
        }

        let classification = TargetClassification::classify(&self.invocations, &descriptions);
        tracing::info!(
            command_id = %self.command_id,
            live = classification.live.len(),
            wrong_platform = classification.wrong_platform.len(),
            faulty = classification.faulty.len(),
            "classified targets"
        );
        Ok(classification)
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
