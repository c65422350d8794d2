// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (C) 2026 Michael Büsch <m@bues.ch>

use crate::template::PipelineTemplate;
use anyhow::{self as ah};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::fs;

const CONF_PATH: &str = "pipeline-mailer.toml";
const CONF_PATH_ENV: &str = "PIPELINE_MAILER_CONF";

const DEFAULT_SMTP_HOST: &str = "smtp.office365.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 60;
const DEFAULT_HELLO_NAME: &str = "localhost";
const DEFAULT_LOG_PATH: &str = "pipeline-mailer.log";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigSmtp {
    host: Option<String>,
    port: Option<u16>,
    timeout: Option<u64>,
    hello_name: Option<String>,
}

impl ConfigSmtp {
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_SMTP_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_SMTP_PORT)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(DEFAULT_SMTP_TIMEOUT_SECS))
    }

    pub fn hello_name(&self) -> &str {
        self.hello_name.as_deref().unwrap_or(DEFAULT_HELLO_NAME)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigLog {
    disabled: Option<bool>,
    path: Option<PathBuf>,
}

impl ConfigLog {
    pub fn disabled(&self) -> bool {
        self.disabled.unwrap_or(false)
    }

    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or(Path::new(DEFAULT_LOG_PATH))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigAttachments {
    dir: Option<PathBuf>,
}

impl ConfigAttachments {
    pub fn dir(&self) -> &Path {
        self.dir.as_deref().unwrap_or(Path::new("."))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    smtp: ConfigSmtp,
    #[serde(default)]
    log: ConfigLog,
    #[serde(default)]
    attachments: ConfigAttachments,
    #[serde(default, rename = "template")]
    templates: Vec<PipelineTemplate>,
}

impl Config {
    pub fn smtp(&self) -> &ConfigSmtp {
        &self.smtp
    }

    pub fn log(&self) -> &ConfigLog {
        &self.log
    }

    pub fn attachments(&self) -> &ConfigAttachments {
        &self.attachments
    }

    /// Additional templates, matched after the built-in ones.
    pub fn templates(&self) -> &[PipelineTemplate] {
        &self.templates
    }
}

impl Config {
    /// Get the configuration file path.
    ///
    /// Returns the path and whether it was given explicitly
    /// through the environment.
    pub fn get_path() -> (PathBuf, bool) {
        match std::env::var_os(CONF_PATH_ENV) {
            Some(path) => (PathBuf::from(path), true),
            None => (PathBuf::from(CONF_PATH), false),
        }
    }

    pub fn parse(content: &str) -> ah::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub async fn load(path: &Path) -> ah::Result<Self> {
        let content = fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Load the configuration file, or use the defaults if it
    /// does not exist and is not `required`.
    pub async fn load_or_default(path: &Path, required: bool) -> ah::Result<Self> {
        match fs::try_exists(path).await {
            Ok(false) if !required => Ok(Self::default()),
            _ => Self::load(path).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let conf = Config::parse("").unwrap();
        assert_eq!(conf.smtp().host(), "smtp.office365.com");
        assert_eq!(conf.smtp().port(), 587);
        assert_eq!(conf.smtp().timeout(), Duration::from_secs(60));
        assert_eq!(conf.smtp().hello_name(), "localhost");
        assert!(!conf.log().disabled());
        assert_eq!(conf.log().path(), Path::new("pipeline-mailer.log"));
        assert_eq!(conf.attachments().dir(), Path::new("."));
        assert!(conf.templates().is_empty());
    }

    #[test]
    fn parse_partial_sections() {
        let toml = r#"
[smtp]
port = 2525

[log]
disabled = true
        "#;
        let conf = Config::parse(toml).unwrap();
        assert_eq!(conf.smtp().host(), "smtp.office365.com");
        assert_eq!(conf.smtp().port(), 2525);
        assert!(conf.log().disabled());
        assert_eq!(conf.log().path(), Path::new("pipeline-mailer.log"));
    }

    #[test]
    fn parse_full_config_and_non_default() {
        let toml = r#"
[smtp]
host = "mail.example.com"
port = 465
timeout = 10
hello_name = "ci-runner.example.com"

[log]
disabled = false
path = "/var/log/pipeline-mailer.log"

[attachments]
dir = "/builds/reports"

[[template]]
key = "Secrets"
subject = "Secret Scanning Reports"
attachments = ["secrets.json", "secrets.html"]
html = "Dear Team"

[[template]]
key = "Lint"
subject = "Lint Reports"
html = "<p>lint</p>"
        "#;
        let conf = Config::parse(toml).unwrap();
        assert_eq!(conf.smtp().host(), "mail.example.com");
        assert_eq!(conf.smtp().port(), 465);
        assert_eq!(conf.smtp().timeout(), Duration::from_secs(10));
        assert_eq!(conf.smtp().hello_name(), "ci-runner.example.com");
        assert!(!conf.log().disabled());
        assert_eq!(conf.log().path(), Path::new("/var/log/pipeline-mailer.log"));
        assert_eq!(conf.attachments().dir(), Path::new("/builds/reports"));

        assert_eq!(conf.templates().len(), 2);
        assert_eq!(
            conf.templates()[0],
            PipelineTemplate::new(
                "Secrets",
                "Secret Scanning Reports",
                &["secrets.json", "secrets.html"],
                "Dear Team"
            )
        );
        assert_eq!(conf.templates()[1].key(), "Lint");
        assert!(conf.templates()[1].attachments().is_empty());
    }

    #[test]
    fn parse_invalid() {
        assert!(Config::parse("[smtp]\nport = \"x\"").is_err());
        assert!(Config::parse("[[template]]\nkey = \"A\"").is_err());
    }

    #[tokio::test]
    async fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let conf = Config::load_or_default(&path, false).await.unwrap();
        assert_eq!(conf.smtp().host(), "smtp.office365.com");

        assert!(Config::load_or_default(&path, true).await.is_err());
    }

    #[tokio::test]
    async fn load_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline-mailer.toml");
        std::fs::write(&path, "[smtp]\nhost = \"relay.example.com\"\n").unwrap();

        let conf = Config::load_or_default(&path, false).await.unwrap();
        assert_eq!(conf.smtp().host(), "relay.example.com");
        assert_eq!(conf.smtp().port(), 587);
    }
}

// vim: ts=4 sw=4 expandtab
