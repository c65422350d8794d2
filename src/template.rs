// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (C) 2026 Michael Büsch <m@bues.ch>

use anyhow::{self as ah, Context as _};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Mail content for one kind of pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineTemplate {
    key: String,
    subject: String,
    #[serde(default)]
    attachments: Vec<String>,
    html: String,
}

impl PipelineTemplate {
    pub fn new(key: &str, subject: &str, attachments: &[&str], html: &str) -> Self {
        Self {
            key: key.to_string(),
            subject: subject.to_string(),
            attachments: attachments.iter().map(|a| (*a).to_string()).collect(),
            html: html.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn attachments(&self) -> &[String] {
        &self.attachments
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// Attachment file paths below `dir`.
    pub fn attachment_paths(&self, dir: &Path) -> Vec<PathBuf> {
        self.attachments.iter().map(|a| dir.join(a)).collect()
    }
}

struct BuiltinTemplate {
    key: &'static str,
    subject: &'static str,
    attachments: &'static [&'static str],
    html: &'static str,
}

const BUILTIN_TEMPLATES: &[BuiltinTemplate] = &[
    BuiltinTemplate {
        key: "SAST",
        subject: "The SAST Assessments Reports",
        attachments: &["SAST_Reports.zip"],
        html: "Dear Team, <br/><br/> This is the <b>SAST Risk Assessments Reports</b> against GitLab<br/>
<br/><b>The Types of Security Scanning have been processed as follows:</b><br/>
1. Credential Scanning<br/>
2. Open-source Libraries (OSS) Scanning<br/>
3. Known Vulnerabilities according to CVSS 3.x<br/>
4. Shell/Terraform/Cloudformation/YAML/Dockerfiles<br/>
5. Python Code/Java Code/JS/Go/Angular<br/>
6. Hardcoding against Data Breaching<br/><br/>Thank You",
    },
    BuiltinTemplate {
        key: "DAST",
        subject: "The DAST Assessments Reports",
        attachments: &["All_ZAP_Reports.zip"],
        html: "Dear Team, <br/><br/> This is the <b>DAST/Pen Testing Assessments Reports</b> against Targeted Web Application(s)<br/>
<br/><b>The OWASP Top 10 vulnerabilities reported:</b><br/>
1. Broken access control<br/>
2. Cryptographic failures<br/>
3. Injection<br/>
4. Insecure design<br/>
5. Security misconfiguration<br/>
6. Vulnerable and outdated components<br/>
7. Identification and authentication failures<br/>
8. Software and data integrity failures<br/>
9. Security logging and monitoring failures<br/>
10. Server-side request forgery (SSRF)<br/><br/>Thank You",
    },
    BuiltinTemplate {
        key: "IPAbusedDB",
        subject: "IP Abuse Investigation Assessments Reports",
        attachments: &["report.xlsx"],
        html: "Dear Team, <br/><br/> This is the <b>IP Abuse Investigation Assessments Reports</b> against Codecommit<br/>
<br/><b>The Types of Security Investigation have been processed as follows:</b><br/>
1. IP Address<br/>
2. Total Reports<br/>
3. Domain<br/>
4. Usage Type<br/>
5. ISP<br/>
6. Abuse Confidence<br/>
7. Score<br/>
8. Is Whitelisted<br/>
9. Last Reported At<br/><br/>Thank You",
    },
];

/// The built-in templates, in match order.
pub fn builtin_templates() -> Vec<PipelineTemplate> {
    BUILTIN_TEMPLATES
        .iter()
        .map(|t| PipelineTemplate::new(t.key, t.subject, t.attachments, t.html))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown pipeline type '{0}'")]
pub struct UnknownPipelineType(pub String);

/// Ordered, immutable table of pipeline templates.
///
/// A template matches a pipeline type if its key occurs anywhere in the
/// pipeline type, ignoring case. The first matching template wins.
#[derive(Debug)]
pub struct TemplateTable {
    entries: Vec<(Regex, PipelineTemplate)>,
}

impl TemplateTable {
    pub fn new(templates: impl IntoIterator<Item = PipelineTemplate>) -> ah::Result<Self> {
        let mut entries = Vec::with_capacity(8);
        for template in templates {
            if template.key.is_empty() {
                return Err(ah::format_err!(
                    "Template with subject '{}' has an empty key",
                    template.subject
                ));
            }
            let re = RegexBuilder::new(&regex::escape(&template.key))
                .case_insensitive(true)
                .build()
                .with_context(|| format!("Compile matcher for template key '{}'", template.key))?;
            entries.push((re, template));
        }
        Ok(Self { entries })
    }

    /// The built-in templates followed by `extra`.
    pub fn with_builtins(extra: &[PipelineTemplate]) -> ah::Result<Self> {
        Self::new(builtin_templates().into_iter().chain(extra.iter().cloned()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn resolve(&self, pipeline_type: &str) -> Result<&PipelineTemplate, UnknownPipelineType> {
        let found = self
            .entries
            .iter()
            .find(|(re, _)| re.is_match(pipeline_type))
            .map(|(_, template)| template);

        if let Some(template) = found {
            tracing::info!(
                "Email content for {pipeline_type} found (key '{}').",
                template.key()
            );
            Ok(template)
        } else {
            tracing::warn!("No matching email content found for pipeline type: {pipeline_type}");
            Err(UnknownPipelineType(pipeline_type.to_string()))
        }
    }
}


// vim: ts=4 sw=4 expandtab
