// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (C) 2026 Michael Büsch <m@bues.ch>

#![forbid(unsafe_code)]

use crate::{
    config::Config,
    log::init_logging,
    mail::{SmtpConnector, SmtpCredentials, Transmitter, smtp::LettreConnector},
    template::TemplateTable,
};
use anyhow::{self as ah, Context as _};
use clap::{Parser, error::ErrorKind};
use itertools::Itertools as _;
use secrecy::SecretString;
use tokio::runtime;

mod config;
mod log;
mod mail;
mod template;

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
struct Opts {
    /// SMTP login user name.
    #[arg(allow_hyphen_values = true)]
    mail_username: String,

    /// SMTP login password or app password.
    #[arg(allow_hyphen_values = true)]
    mail_app_password: String,

    /// Pipeline type, e.g. the CI job name. Selects the report template.
    #[arg(allow_hyphen_values = true)]
    pipeline_type: String,

    /// Sender address.
    #[arg(allow_hyphen_values = true)]
    from_email: String,

    /// Recipient address.
    #[arg(allow_hyphen_values = true)]
    recipient_email: String,

    /// Further arguments are ignored.
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    extra: Vec<String>,
}

/// Parse the command line. Exits with status 1 on usage errors.
fn parse_opts() -> Opts {
    match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    }
}

/// Resolve the report template and send the e-mail.
async fn run<C: SmtpConnector>(
    conf: &Config,
    opts: &Opts,
    transmitter: &Transmitter<C>,
) -> ah::Result<()> {
    if !opts.extra.is_empty() {
        tracing::debug!("Ignoring extra arguments: {}", opts.extra.iter().join(" "));
    }

    let table = TemplateTable::with_builtins(conf.templates()).context("Build template table")?;
    tracing::debug!("{} report templates available", table.len());

    let template = table.resolve(&opts.pipeline_type)?;
    tracing::info!(
        "Using template '{}' with attachments [{}]",
        template.key(),
        template.attachments().iter().join(", ")
    );

    let credentials = SmtpCredentials::new(
        conf.smtp().host(),
        conf.smtp().port(),
        &opts.mail_username,
        SecretString::from(opts.mail_app_password.clone()),
    );
    let recipients = vec![opts.recipient_email.clone()];

    transmitter
        .send_mail(
            &credentials,
            &opts.from_email,
            &recipients,
            template.subject(),
            template.html(),
            &template.attachment_paths(conf.attachments().dir()),
        )
        .await
        .context("Send report e-mail")?;

    tracing::info!("The email has been sent successfully.");
    Ok(())
}

async fn async_main(opts: Opts) -> ah::Result<()> {
    // Load the configuration file.
    let (conf_path, required) = Config::get_path();
    let conf = Config::load_or_default(&conf_path, required)
        .await
        .with_context(|| format!("Load configuration file '{}'", conf_path.display()))?;

    init_logging(conf.log());

    let transmitter = Transmitter::new(LettreConnector::new(
        Some(conf.smtp().timeout()),
        conf.smtp().hello_name(),
    ));

    run(&conf, &opts, &transmitter)
        .await
        .inspect_err(|e| tracing::error!("An error occurred: {e:#}"))?;

    println!("The email has been sent successfully.");
    Ok(())
}

fn main() -> ah::Result<()> {
    let opts = parse_opts();

    runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Tokio runtime builder")?
        .block_on(async_main(opts))
}


// vim: ts=4 sw=4 expandtab
