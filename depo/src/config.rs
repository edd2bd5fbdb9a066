// This file is part of the product Depo.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: u64, // 0 means unlimited
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8484
}

fn default_workers() -> usize {
    2
}

fn default_max_upload_mb() -> u64 {
    100
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            workers: default_workers(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// One storage channel. Uploads address a channel by `id` or `name`; the
/// deploy keys gate mutating access when present.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChannelConfig {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub deploy_keys: Vec<String>,
    #[serde(default = "default_veto_duplicates")]
    pub veto_duplicates: bool,
    #[serde(default)]
    pub max_artifacts: Option<usize>,
}

fn default_veto_duplicates() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
        let content = fs::read_to_string(path).map_err(|err| {
            ConfigError::LoadError(format!("Failed to read {}: {}", path.display(), err))
        })?;
        serde_yaml::from_str(&content).map_err(|err| {
            ConfigError::LoadError(format!("Failed to parse {}: {}", path.display(), err))
        })
    }
}

/// Configuration after the validation pass. Construction is the only way in,
/// so the rest of the code never re-checks these invariants.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub channels: Vec<ChannelConfig>,
}

impl ValidatedConfig {
    pub fn from_config(config: AppConfig) -> Result<ValidatedConfig, ConfigError> {
        if config.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must not be 0".to_string(),
            ));
        }
        if config.server.workers == 0 {
            return Err(ConfigError::ValidationError(
                "server.workers must be at least 1".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for channel in &config.channels {
            if channel.id.is_empty() {
                return Err(ConfigError::ValidationError(
                    "channel id must not be empty".to_string(),
                ));
            }
            if !is_reference_token(&channel.id) {
                return Err(ConfigError::ValidationError(format!(
                    "channel id '{}' contains reserved characters",
                    channel.id
                )));
            }
            if !seen.insert(channel.id.clone()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate channel reference '{}'",
                    channel.id
                )));
            }
            if let Some(name) = &channel.name {
                if name.is_empty() {
                    return Err(ConfigError::ValidationError(format!(
                        "channel '{}' has an empty name",
                        channel.id
                    )));
                }
                if !is_reference_token(name) {
                    return Err(ConfigError::ValidationError(format!(
                        "channel name '{}' contains reserved characters",
                        name
                    )));
                }
                if !seen.insert(name.clone()) {
                    return Err(ConfigError::ValidationError(format!(
                        "duplicate channel reference '{}'",
                        name
                    )));
                }
            }
            if channel.deploy_keys.iter().any(String::is_empty) {
                return Err(ConfigError::ValidationError(format!(
                    "channel '{}' has an empty deploy key",
                    channel.id
                )));
            }
        }

        Ok(ValidatedConfig {
            server: config.server,
            logging: config.logging,
            channels: config.channels,
        })
    }

    pub fn max_upload_bytes(&self) -> usize {
        if self.server.max_upload_mb == 0 {
            usize::MAX
        } else {
            (self.server.max_upload_mb as usize) * 1024 * 1024
        }
    }
}

// Channel references live in the URL path; '/' would break routing and ':'
// would collide with metadata keys.
fn is_reference_token(value: &str) -> bool {
    !value.contains('/') && !value.contains(':')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn channel(id: &str, name: Option<&str>) -> ChannelConfig {
        ChannelConfig {
            id: id.to_string(),
            name: name.map(str::to_string),
            deploy_keys: vec![],
            veto_duplicates: true,
            max_artifacts: None,
        }
    }

    #[test]
    fn defaults_apply_to_empty_yaml() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("parse");
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.server.port, 8484);
        assert_eq!(config.server.max_upload_mb, 100);
        assert_eq!(config.logging.level, "info");
        assert!(config.channels.is_empty());
    }

    #[test]
    fn channel_defaults() {
        let yaml = "channels:\n  - id: chan-1\n";
        let config: AppConfig = serde_yaml::from_str(yaml).expect("parse");
        let channel = &config.channels[0];
        assert!(channel.veto_duplicates);
        assert!(channel.deploy_keys.is_empty());
        assert!(channel.max_artifacts.is_none());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "server:\n  port: 9090\nchannels:\n  - id: chan-1\n    name: main")
            .expect("write");

        let config = AppConfig::load(file.path()).expect("load");
        let validated = ValidatedConfig::from_config(config).expect("validate");
        assert_eq!(validated.server.port, 9090);
        assert_eq!(validated.channels[0].name.as_deref(), Some("main"));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = AppConfig::load(Path::new("/nonexistent/config.yaml")).expect_err("missing");
        assert!(matches!(err, ConfigError::LoadError(_)));
    }

    #[test]
    fn duplicate_references_are_rejected() {
        let config = AppConfig {
            channels: vec![channel("chan-1", Some("main")), channel("main", None)],
            ..AppConfig::default()
        };
        let err = ValidatedConfig::from_config(config).expect_err("duplicate");
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn reserved_characters_are_rejected() {
        for bad in ["with/slash", "with:colon"] {
            let config = AppConfig {
                channels: vec![channel(bad, None)],
                ..AppConfig::default()
            };
            assert!(ValidatedConfig::from_config(config).is_err(), "{}", bad);
        }
    }

    #[test]
    fn zero_upload_limit_means_unlimited() {
        let config = AppConfig {
            server: ServerConfig {
                max_upload_mb: 0,
                ..ServerConfig::default()
            },
            ..AppConfig::default()
        };
        let validated = ValidatedConfig::from_config(config).expect("validate");
        assert_eq!(validated.max_upload_bytes(), usize::MAX);
    }
}
