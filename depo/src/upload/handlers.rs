// This file is part of the product Depo.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::app_state::AppState;
use crate::channel::{ChannelError, ChannelRef, ModifiableChannel};
use crate::iam::AuthDecision;
use crate::meta_key;
use crate::upload::response::{channel_error_response, send_response};
use crate::upload::router::{self, RouteDecision};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use futures_util::StreamExt;
use log::{debug, info};

const GET_NOT_ALLOWED: &str =
    "The GET method is not allowed for the Upload service. Use POST or PUT instead.";

/// The upload service owns the whole path space it is mounted on: routing by
/// arity and target type happens in `router`, not in the HTTP framework.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.default_service(web::route().to(dispatch));
}

async fn dispatch(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> HttpResponse {
    match req.method().as_str() {
        "PUT" | "POST" => process_upload(req, payload, state).await,
        "GET" => send_response(StatusCode::METHOD_NOT_ALLOWED, GET_NOT_ALLOWED),
        _ => send_response(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed. Use POST or PUT.",
        ),
    }
}

async fn process_upload(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> HttpResponse {
    let raw_path = req.path().to_string();
    let path = match urlencoding::decode(&raw_path) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw_path,
    };

    let decision = match router::route(&path) {
        Ok(decision) => decision,
        Err(err) => return send_response(StatusCode::BAD_REQUEST, &err.to_string()),
    };

    match decision {
        RouteDecision::Channel {
            reference,
            parent,
            name,
        } => upload_to_channel(req, payload, state, reference, parent, name).await,
    }
}

async fn upload_to_channel(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<AppState>,
    reference: String,
    parent: Option<String>,
    name: String,
) -> HttpResponse {
    let reference = ChannelRef::name_or_id(reference);

    match state.authenticator.authenticate(&reference, &req) {
        AuthDecision::Denied(response) => return response,
        AuthDecision::Granted => {}
    }

    let query = req.query_string().to_string();
    let max_bytes = state.max_upload_bytes;

    // The payload is drained inside the access scope: the channel lock covers
    // the whole creation, and the stream is consumed at most once.
    let result = state
        .channels
        .access_call(&reference, async move |channel| {
            store(channel, parent.as_deref(), &name, &query, payload, max_bytes).await
        })
        .await;

    match result {
        Ok(Some(id)) => {
            info!("Stored artifact {} in channel {}", id, reference);
            send_response(StatusCode::OK, &id)
        }
        Ok(None) => {
            info!("Channel {} vetoed the upload", reference);
            send_response(StatusCode::OK, "")
        }
        Err(err) => {
            debug!("Upload to channel {} failed: {}", reference, err);
            channel_error_response(&err)
        }
    }
}

/// The upload executor: metadata first, then the payload, then the creation
/// primitive. A malformed metadata key rejects the call before any bytes are
/// stored; a veto comes back as `Ok(None)`.
async fn store(
    channel: &mut ModifiableChannel,
    parent: Option<&str>,
    name: &str,
    query: &str,
    mut payload: web::Payload,
    max_bytes: usize,
) -> Result<Option<String>, ChannelError> {
    let metadata =
        meta_key::collect_metadata(query).map_err(|err| ChannelError::validation(err.to_string()))?;

    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk
            .map_err(|err| ChannelError::internal(format!("Failed to read upload payload: {}", err)))?;
        if body.len().saturating_add(chunk.len()) > max_bytes {
            return Err(ChannelError::validation(
                "Upload payload exceeds the configured size limit",
            ));
        }
        body.extend_from_slice(&chunk);
    }

    let created = channel.create_artifact(parent, &body, name, metadata)?;
    Ok(created.map(|info| info.id))
}
