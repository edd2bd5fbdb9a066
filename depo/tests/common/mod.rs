// This file is part of the product Depo.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use depo::app_state::AppState;
use depo::channel::{ArtifactInfo, ChannelRef};
use depo::config::{AppConfig, ChannelConfig, LoggingConfig, ServerConfig, ValidatedConfig};
use depo::upload;

pub const DEPLOY_KEY: &str = "test-deploy-key";

/// Seeded channels:
/// - `main` (`chan-main`): open, duplicate veto on.
/// - `locked` (`chan-locked`): requires the deploy key.
/// - `tiny` (`chan-tiny`): quota of one artifact.
/// - `open` (`chan-open`): duplicate veto off.
pub struct TestHarness {
    pub config: ValidatedConfig,
    pub state: web::Data<AppState>,
}

impl TestHarness {
    pub fn new() -> Self {
        let config = ValidatedConfig::from_config(build_config()).expect("valid test config");
        let state = web::Data::new(AppState::from_config(&config));
        Self { config, state }
    }
}

fn channel(id: &str, name: &str) -> ChannelConfig {
    ChannelConfig {
        id: id.to_string(),
        name: Some(name.to_string()),
        deploy_keys: vec![],
        veto_duplicates: true,
        max_artifacts: None,
    }
}

pub fn build_config() -> AppConfig {
    AppConfig {
        server: ServerConfig::default(),
        logging: LoggingConfig::default(),
        channels: vec![
            channel("chan-main", "main"),
            ChannelConfig {
                deploy_keys: vec![DEPLOY_KEY.to_string()],
                ..channel("chan-locked", "locked")
            },
            ChannelConfig {
                max_artifacts: Some(1),
                ..channel("chan-tiny", "tiny")
            },
            ChannelConfig {
                veto_duplicates: false,
                ..channel("chan-open", "open")
            },
        ],
    }
}

pub fn build_test_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .configure(upload::handlers::configure)
}

pub async fn artifact_count(state: &web::Data<AppState>, reference: &str) -> usize {
    let reference = ChannelRef::name_or_id(reference);
    state
        .channels
        .access_call(&reference, async |channel| Ok(channel.artifact_count()))
        .await
        .expect("known channel")
}

pub async fn creation_attempts(state: &web::Data<AppState>, reference: &str) -> u64 {
    let reference = ChannelRef::name_or_id(reference);
    state
        .channels
        .access_call(&reference, async |channel| Ok(channel.creation_attempts()))
        .await
        .expect("known channel")
}

pub async fn find_artifact(
    state: &web::Data<AppState>,
    reference: &str,
    name: &str,
) -> Option<ArtifactInfo> {
    let reference = ChannelRef::name_or_id(reference);
    let name = name.to_string();
    state
        .channels
        .access_call(&reference, async move |channel| {
            Ok(channel
                .artifacts()
                .find(|artifact| artifact.name == name)
                .cloned())
        })
        .await
        .expect("known channel")
}

pub async fn artifact_payload(
    state: &web::Data<AppState>,
    reference: &str,
    id: &str,
) -> Option<Vec<u8>> {
    let reference = ChannelRef::name_or_id(reference);
    let id = id.to_string();
    state
        .channels
        .access_call(&reference, async move |channel| {
            Ok(channel.payload(&id).map(<[u8]>::to_vec))
        })
        .await
        .expect("known channel")
}

/// Sum of creation attempts across all seeded channels; zero proves no
/// request ever reached a creation primitive.
pub async fn total_creation_attempts(state: &web::Data<AppState>) -> u64 {
    let mut total = 0;
    for reference in ["chan-main", "chan-locked", "chan-tiny", "chan-open"] {
        total += creation_attempts(state, reference).await;
    }
    total
}
