// This file is part of the product Depo.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::channel::{ChannelError, ChannelErrorKind};
use actix_web::HttpResponse;
use actix_web::http::StatusCode;

/// Every terminal upload response is `text/plain` with a single message line
/// and exactly one trailing newline. No structured error bodies: the wire
/// contract is deliberately minimal.
pub fn send_response(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/plain")
        .body(format!("{}\n", message))
}

pub fn channel_error_response(error: &ChannelError) -> HttpResponse {
    let status = match error.kind() {
        ChannelErrorKind::NotFound => StatusCode::NOT_FOUND,
        ChannelErrorKind::Validation => StatusCode::BAD_REQUEST,
        ChannelErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    send_response(status, error.message())
}
