// This file is part of the product Depo.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::sync::Arc;

use crate::channel::ChannelRegistry;
use crate::config::ValidatedConfig;
use crate::iam::ChannelAuthenticator;

pub struct AppState {
    pub channels: Arc<ChannelRegistry>,
    pub authenticator: ChannelAuthenticator,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn from_config(config: &ValidatedConfig) -> Self {
        Self {
            channels: Arc::new(ChannelRegistry::from_config(&config.channels)),
            authenticator: ChannelAuthenticator::from_config(&config.channels),
            max_upload_bytes: config.max_upload_bytes(),
        }
    }
}
