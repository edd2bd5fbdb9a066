// This file is part of the product Depo.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::meta_key::MetadataMap;
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt;

/// Opaque channel reference: either a stable channel id or an assigned name.
/// The registry decides resolution order (id first, then name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRef(String);

impl ChannelRef {
    pub fn name_or_id(raw: impl Into<String>) -> ChannelRef {
        ChannelRef(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Record of one stored artifact version.
#[derive(Debug, Clone)]
pub struct ArtifactInfo {
    pub id: String,
    pub name: String,
    pub parent: Option<String>,
    pub size: u64,
    pub metadata: MetadataMap,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelErrorKind {
    NotFound,
    Validation,
    Internal,
}

/// Boundary error for channel access and artifact creation. The kind set is
/// closed on purpose: the response mapper translates it to a status code
/// without inspecting any wrapped error chain.
#[derive(Debug, Clone)]
pub struct ChannelError {
    kind: ChannelErrorKind,
    message: String,
}

impl ChannelError {
    pub fn new(kind: ChannelErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ChannelErrorKind::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ChannelErrorKind::Validation, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ChannelErrorKind::Internal, message)
    }

    pub fn kind(&self) -> ChannelErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} error: {}", self.kind, self.message)
    }
}

impl Error for ChannelError {}
