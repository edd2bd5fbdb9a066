// This file is part of the product Depo.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::rt::System;
use actix_web::{App, HttpServer, middleware::Logger, web};
use depo::app_state::AppState;
use depo::config::{AppConfig, ValidatedConfig};
use depo::upload;
use log::{LevelFilter, info};
use std::io::Write;
use std::path::PathBuf;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let config_path = match parse_args() {
        Ok(path) => path,
        Err(error) => {
            eprintln!("❌ Invalid command line arguments: {}", error);
            eprintln!("❌ Use -C <file> to point at the configuration file.");
            return 1;
        }
    };

    let config = match AppConfig::load(&config_path) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("❌ {}", error);
            return 1;
        }
    };

    let validated_config = match ValidatedConfig::from_config(config) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("❌ {}", error);
            eprintln!("❌ Application cannot start with invalid configuration.");
            return 1;
        }
    };

    match System::new().block_on(run_server(validated_config)) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("❌ Server failed to start: {}", error);
            1
        }
    }
}

fn parse_args() -> Result<PathBuf, String> {
    let mut args = std::env::args().skip(1);
    let mut config_path = PathBuf::from("config.yaml");
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-C" => {
                config_path = args
                    .next()
                    .map(PathBuf::from)
                    .ok_or_else(|| "missing value for -C".to_string())?;
            }
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }
    Ok(config_path)
}

async fn run_server(config: ValidatedConfig) -> std::io::Result<()> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };

    // Configure logging with a stable format
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let state = web::Data::new(AppState::from_config(&config));
    info!(
        "✅ Channel registry initialized with {} channel(s)",
        state.channels.len()
    );

    let bind_address = config.server.bind.clone();
    let port = config.server.port;
    let workers = config.server.workers;
    info!("Upload service listening on {}:{}", bind_address, port);

    let state_for_app = state.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state_for_app.clone())
            .configure(upload::handlers::configure)
    })
    .workers(workers)
    .bind((bind_address, port))?
    .run()
    .await
}
