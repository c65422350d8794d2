// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (C) 2026 Michael Büsch <m@bues.ch>

use crate::config::ConfigLog;
use anyhow::{self as ah, Context as _};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt::writer::BoxMakeWriter};

/// Open the log file for appending.
fn log_file(path: &Path) -> ah::Result<RollingFileAppender> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let name = path
        .file_name()
        .context("Log file path has no file name")?
        .to_string_lossy();
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
        .with_context(|| format!("Open log file '{}'", path.display()))
}

/// Install the global log subscriber.
///
/// Logs go to the configured file. Falls back to stderr, if the
/// file cannot be opened. `RUST_LOG` overrides the default `info` level.
pub fn init_logging(conf: &ConfigLog) {
    if conf.disabled() {
        return;
    }

    let (writer, file_error) = match log_file(conf.path()) {
        Ok(file) => (BoxMakeWriter::new(file), None),
        Err(e) => (BoxMakeWriter::new(std::io::stderr), Some(e)),
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
    {
        eprintln!("Failed to initialize logging: {e}");
        return;
    }

    if let Some(e) = file_error {
        tracing::warn!("{e:#}. Logging to stderr.");
    }
}


// vim: ts=4 sw=4 expandtab
