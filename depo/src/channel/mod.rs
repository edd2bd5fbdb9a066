// This file is part of the product Depo.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod types;

use crate::config::ChannelConfig;
use crate::meta_key::MetadataMap;
use chrono::Utc;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

pub use types::{ArtifactInfo, ChannelError, ChannelErrorKind, ChannelRef};

/// Channel-side creation policy. A policy refusal is a veto, not an error:
/// creation returns `Ok(None)` and the caller reports success with no id.
#[derive(Debug, Clone)]
pub struct ChannelPolicy {
    pub veto_duplicates: bool,
    pub max_artifacts: Option<usize>,
}

impl Default for ChannelPolicy {
    fn default() -> Self {
        Self {
            veto_duplicates: true,
            max_artifacts: None,
        }
    }
}

/// One mutable channel: the unit of mutation concurrency. All access goes
/// through `ChannelRegistry::access_call`, which holds the channel lock for
/// the duration of the closure.
pub struct ModifiableChannel {
    id: String,
    name: Option<String>,
    policy: ChannelPolicy,
    artifacts: HashMap<String, ArtifactInfo>,
    payloads: HashMap<String, Vec<u8>>,
    creation_attempts: u64,
}

impl ModifiableChannel {
    pub fn new(id: impl Into<String>, name: Option<String>, policy: ChannelPolicy) -> Self {
        Self {
            id: id.into(),
            name,
            policy,
            artifacts: HashMap::new(),
            payloads: HashMap::new(),
            creation_attempts: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Records a new artifact version, optionally as a child of an existing
    /// artifact. `Ok(None)` means the channel vetoed the creation.
    pub fn create_artifact(
        &mut self,
        parent: Option<&str>,
        payload: &[u8],
        name: &str,
        metadata: MetadataMap,
    ) -> Result<Option<ArtifactInfo>, ChannelError> {
        self.creation_attempts += 1;

        if name.is_empty() {
            return Err(ChannelError::validation("Artifact name must not be empty"));
        }

        if let Some(parent_id) = parent {
            if !self.artifacts.contains_key(parent_id) {
                return Err(ChannelError::validation(format!(
                    "Unable to find parent artifact: {}",
                    parent_id
                )));
            }
        }

        if let Some(limit) = self.policy.max_artifacts {
            if self.artifacts.len() >= limit {
                debug!(
                    "Channel {} vetoed artifact '{}': quota of {} reached",
                    self.id, name, limit
                );
                return Ok(None);
            }
        }

        if self.policy.veto_duplicates
            && self.artifacts.values().any(|artifact| artifact.name == name)
        {
            debug!("Channel {} vetoed duplicate artifact '{}'", self.id, name);
            return Ok(None);
        }

        let info = ArtifactInfo {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            parent: parent.map(str::to_string),
            size: payload.len() as u64,
            metadata,
            created_at: Utc::now(),
        };
        self.payloads.insert(info.id.clone(), payload.to_vec());
        self.artifacts.insert(info.id.clone(), info.clone());
        Ok(Some(info))
    }

    pub fn artifact(&self, id: &str) -> Option<&ArtifactInfo> {
        self.artifacts.get(id)
    }

    pub fn artifacts(&self) -> impl Iterator<Item = &ArtifactInfo> {
        self.artifacts.values()
    }

    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }

    /// Number of creation calls this channel has seen, vetoed ones included.
    pub fn creation_attempts(&self) -> u64 {
        self.creation_attempts
    }

    pub fn payload(&self, id: &str) -> Option<&[u8]> {
        self.payloads.get(id).map(Vec::as_slice)
    }
}

/// Registry of channels, resolvable by id or by name. Owns one async lock per
/// channel; the lock never escapes — callers get a scoped `access_call` and
/// nothing else, so mutations on one channel can never interleave.
pub struct ChannelRegistry {
    channels: HashMap<String, Arc<Mutex<ModifiableChannel>>>,
    names: HashMap<String, String>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self {
            channels: HashMap::new(),
            names: HashMap::new(),
        }
    }

    pub fn from_config(channels: &[ChannelConfig]) -> Self {
        let mut registry = Self::new();
        for channel in channels {
            let policy = ChannelPolicy {
                veto_duplicates: channel.veto_duplicates,
                max_artifacts: channel.max_artifacts,
            };
            registry.insert(ModifiableChannel::new(
                channel.id.clone(),
                channel.name.clone(),
                policy,
            ));
        }
        registry
    }

    pub fn insert(&mut self, channel: ModifiableChannel) {
        if let Some(name) = channel.name() {
            self.names.insert(name.to_string(), channel.id().to_string());
        }
        self.channels
            .insert(channel.id().to_string(), Arc::new(Mutex::new(channel)));
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    fn resolve(&self, reference: &ChannelRef) -> Option<Arc<Mutex<ModifiableChannel>>> {
        if let Some(channel) = self.channels.get(reference.as_str()) {
            return Some(channel.clone());
        }
        let id = self.names.get(reference.as_str())?;
        self.channels.get(id).cloned()
    }

    /// Runs `f` with exclusive mutating access to the referenced channel.
    /// The lock is held for exactly the duration of the closure and released
    /// on every exit path. Calls against different channels do not contend.
    pub async fn access_call<T, F>(&self, reference: &ChannelRef, f: F) -> Result<T, ChannelError>
    where
        F: AsyncFnOnce(&mut ModifiableChannel) -> Result<T, ChannelError>,
    {
        let handle = self.resolve(reference).ok_or_else(|| {
            ChannelError::not_found(format!("Unable to find channel: {}", reference))
        })?;
        let mut channel = handle.lock().await;
        f(&mut *channel).await
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
