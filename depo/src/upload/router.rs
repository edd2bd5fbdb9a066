// This file is part of the product Depo.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::fmt;

/// Routed upload target. Closed set: adding a target type means adding a
/// variant here and a match arm in the handler, checked at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Channel {
        reference: String,
        parent: Option<String>,
        name: String,
    },
}

/// Terminal routing failures; all map to HTTP 400 before any channel access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    NoTarget,
    MissingTarget,
    MissingArtifactName,
    UnknownTargetType(String),
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::NoTarget => f.write_str("No target"),
            RouteError::MissingTarget => f.write_str("Missing target"),
            RouteError::MissingArtifactName => f.write_str("Missing artifact name"),
            RouteError::UnknownTargetType(target) => {
                write!(f, "Unknown target type: {}", target)
            }
        }
    }
}

impl std::error::Error for RouteError {}

/// Parses the request path into an upload target.
///
/// Leading and trailing runs of `/` are stripped, internal ones are not. The
/// split is capped at four segments: the fourth absorbs any remaining
/// `/`-delimited text, so a child-form artifact name may itself contain `/`.
/// Arity is checked before the target type, so `foo/bar` is a missing name,
/// not an unknown target.
pub fn route(path: &str) -> Result<RouteDecision, RouteError> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Err(RouteError::NoTarget);
    }

    let segments: Vec<&str> = trimmed.splitn(4, '/').collect();
    match segments.len() {
        1 => Err(RouteError::MissingTarget),
        2 => Err(RouteError::MissingArtifactName),
        _ => match segments[0] {
            "channel" => {
                if segments.len() == 3 {
                    Ok(RouteDecision::Channel {
                        reference: segments[1].to_string(),
                        parent: None,
                        name: segments[2].to_string(),
                    })
                } else {
                    Ok(RouteDecision::Channel {
                        reference: segments[1].to_string(),
                        parent: Some(segments[2].to_string()),
                        name: segments[3].to_string(),
                    })
                }
            }
            other => Err(RouteError::UnknownTargetType(other.to_string())),
        },
    }
}
