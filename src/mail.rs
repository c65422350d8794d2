// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (C) 2026 Michael Büsch <m@bues.ch>

use itertools::Itertools as _;
use lettre::{
    Message,
    address::{AddressError, Envelope},
    message::{
        Attachment, Body, Mailbox, MultiPart, SinglePart,
        header::{ContentTransferEncoding, ContentType},
    },
};
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use tokio::fs;

pub mod smtp;
#[cfg(test)]
pub mod testing;

/// Boxed cause of a failed SMTP step.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Attachment '{}' not found or unreadable", path.display())]
    AttachmentNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid mail address '{address}'")]
    InvalidAddress {
        address: String,
        #[source]
        source: AddressError,
    },
    #[error("Compose e-mail: {0}")]
    Compose(String),
    #[error("Error occurred while sending e-mail")]
    Transmission(#[source] TransportError),
}

/// SMTP relay and login. Owned by the caller.
#[derive(Debug)]
pub struct SmtpCredentials {
    host: String,
    port: u16,
    username: String,
    password: SecretString,
}

impl SmtpCredentials {
    pub fn new(host: &str, port: u16, username: &str, password: SecretString) -> Self {
        Self {
            host: host.to_string(),
            port,
            username: username.to_string(),
            password,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }
}

/// A file attached to an [`OutgoingMessage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageAttachment {
    pub filename: String,
    pub data: Vec<u8>,
}

/// One e-mail, fully loaded into memory and ready to be transmitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    from: String,
    to: Vec<String>,
    subject: String,
    html_body: String,
    attachments: Vec<MessageAttachment>,
}

async fn read_attachment(path: &Path) -> Result<MessageAttachment, MailError> {
    let not_found = |source| MailError::AttachmentNotFound {
        path: path.to_path_buf(),
        source,
    };
    let data = fs::read(path).await.map_err(not_found)?;
    // Only the base name goes into the message.
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            not_found(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no file name",
            ))
        })?;
    tracing::info!("Attached file: {}", path.display());
    Ok(MessageAttachment { filename, data })
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse()
        .map_err(|source| MailError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}

impl OutgoingMessage {
    /// Build a message and load all attachments.
    ///
    /// Fails on the first attachment that cannot be read.
    pub async fn compose(
        from: &str,
        to: &[String],
        subject: &str,
        html_body: &str,
        attachment_paths: &[PathBuf],
    ) -> Result<Self, MailError> {
        tracing::info!("Preparing to send email with subject: {subject}");

        let mut attachments = Vec::with_capacity(attachment_paths.len());
        for path in attachment_paths {
            attachments.push(read_attachment(path).await.inspect_err(|e| {
                tracing::error!("{e}");
            })?);
        }

        Ok(Self {
            from: from.to_string(),
            to: to.to_vec(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
            attachments,
        })
    }

    pub fn to(&self) -> &[String] {
        &self.to
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn attachments(&self) -> &[MessageAttachment] {
        &self.attachments
    }

    /// Assemble the `multipart/mixed` MIME message.
    pub fn to_message(&self) -> Result<Message, MailError> {
        let mut builder = Message::builder()
            .from(parse_mailbox(&self.from)?)
            .subject(&self.subject)
            .user_agent("pipeline-mailer".to_string());
        for to in &self.to {
            builder = builder.to(parse_mailbox(to)?);
        }

        let octet_stream = ContentType::parse("application/octet-stream")
            .map_err(|e| MailError::Compose(e.to_string()))?;

        let mut multipart =
            MultiPart::mixed().singlepart(SinglePart::html(self.html_body.clone()));
        for attachment in &self.attachments {
            let body = Body::new_with_encoding(
                attachment.data.clone(),
                ContentTransferEncoding::Base64,
            )
            .map_err(|_| MailError::Compose(format!("Encode attachment '{}'", attachment.filename)))?;
            multipart = multipart.singlepart(
                Attachment::new(attachment.filename.clone()).body(body, octet_stream.clone()),
            );
        }

        builder
            .multipart(multipart)
            .map_err(|e| MailError::Compose(e.to_string()))
    }
}

/// One open SMTP connection.
///
/// The transmitter drives it as
/// `starttls` -> `login` -> `send` -> `quit`, and calls `abort` instead of
/// the remaining steps as soon as one of them fails.
pub trait SmtpSession {
    async fn starttls(&mut self) -> Result<(), TransportError>;
    async fn login(&mut self, username: &str, password: &SecretString) -> Result<(), TransportError>;
    async fn send(&mut self, envelope: &Envelope, email: &[u8]) -> Result<(), TransportError>;
    async fn quit(&mut self) -> Result<(), TransportError>;
    async fn abort(&mut self);
}

/// Opens [`SmtpSession`]s.
pub trait SmtpConnector {
    type Session: SmtpSession;

    async fn connect(&self, host: &str, port: u16) -> Result<Self::Session, TransportError>;
}

async fn deliver<S: SmtpSession>(
    session: &mut S,
    credentials: &SmtpCredentials,
    envelope: &Envelope,
    email: &[u8],
) -> Result<(), TransportError> {
    session.starttls().await?;
    tracing::debug!("SMTP channel secured");
    session
        .login(credentials.username(), credentials.password())
        .await?;
    tracing::debug!("SMTP login as '{}' accepted", credentials.username());
    session.send(envelope, email).await?;
    Ok(())
}

/// Sends [`OutgoingMessage`]s through connections opened by `C`.
pub struct Transmitter<C> {
    connector: C,
}

impl<C: SmtpConnector> Transmitter<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Transmit one message in a fresh SMTP session.
    ///
    /// The message is fully assembled before the connection is opened.
    pub async fn send(
        &self,
        credentials: &SmtpCredentials,
        message: &OutgoingMessage,
    ) -> Result<(), MailError> {
        let email = message.to_message()?;
        let envelope = email.envelope().clone();
        let raw = email.formatted();

        tracing::debug!(
            "Message '{}' with {} attachment(s), {} bytes",
            message.subject(),
            message.attachments().len(),
            raw.len()
        );
        tracing::info!(
            "Connecting to SMTP server: {}:{}",
            credentials.host(),
            credentials.port()
        );
        let mut session = self
            .connector
            .connect(credentials.host(), credentials.port())
            .await
            .map_err(|e| {
                tracing::error!("SMTP connect failed: {e}");
                MailError::Transmission(e)
            })?;

        match deliver(&mut session, credentials, &envelope, &raw).await {
            Ok(()) => {
                if let Err(e) = session.quit().await {
                    tracing::warn!("SMTP QUIT failed after delivery: {e}");
                }
                tracing::info!(
                    "Email sent successfully to {}.",
                    message.to().iter().join(",")
                );
                Ok(())
            }
            Err(e) => {
                session.abort().await;
                tracing::error!("SMTP error occurred: {e}");
                Err(MailError::Transmission(e))
            }
        }
    }

    /// Compose a message from files on disk and transmit it.
    ///
    /// A missing attachment fails before any connection is attempted.
    pub async fn send_mail(
        &self,
        credentials: &SmtpCredentials,
        from: &str,
        recipients: &[String],
        subject: &str,
        html_body: &str,
        attachment_paths: &[PathBuf],
    ) -> Result<(), MailError> {
        let message =
            OutgoingMessage::compose(from, recipients, subject, html_body, attachment_paths).await?;
        self.send(credentials, &message).await
    }
}


// vim: ts=4 sw=4 expandtab
