// This file is part of the product Depo.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::channel::ChannelRef;
use crate::config::ChannelConfig;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use log::debug;
use std::collections::HashMap;

/// Outcome of authenticating an upload against a channel. On `Denied` the
/// response is already finalized; the upload layer writes nothing further.
pub enum AuthDecision {
    Granted,
    Denied(HttpResponse),
}

/// Deploy-key authenticator. A channel with configured deploy keys requires
/// HTTP Basic credentials whose password matches one of the keys; the
/// username is ignored. A channel with no keys is open, as is an unknown
/// reference — resolution reports not-found afterwards.
pub struct ChannelAuthenticator {
    keys: HashMap<String, Vec<String>>,
}

impl ChannelAuthenticator {
    pub fn from_config(channels: &[ChannelConfig]) -> Self {
        let mut keys = HashMap::new();
        for channel in channels {
            if channel.deploy_keys.is_empty() {
                continue;
            }
            keys.insert(channel.id.clone(), channel.deploy_keys.clone());
            if let Some(name) = &channel.name {
                keys.insert(name.clone(), channel.deploy_keys.clone());
            }
        }
        Self { keys }
    }

    pub fn authenticate(&self, reference: &ChannelRef, req: &HttpRequest) -> AuthDecision {
        let Some(keys) = self.keys.get(reference.as_str()) else {
            return AuthDecision::Granted;
        };

        match basic_password(req) {
            Some(password) if keys.iter().any(|key| *key == password) => AuthDecision::Granted,
            Some(_) => {
                debug!("Rejected upload to channel {}: bad deploy key", reference);
                AuthDecision::Denied(unauthorized_response())
            }
            None => {
                debug!("Rejected upload to channel {}: no credentials", reference);
                AuthDecision::Denied(unauthorized_response())
            }
        }
    }
}

fn basic_password(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;
    let (_user, password) = credentials.split_once(':')?;
    Some(password.to_string())
}

fn unauthorized_response() -> HttpResponse {
    HttpResponse::Unauthorized()
        .insert_header((header::WWW_AUTHENTICATE, "Basic realm=\"depo\""))
        .content_type("text/plain")
        .body("Authentication required\n")
}
