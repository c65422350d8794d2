// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (C) 2026 Michael Büsch <m@bues.ch>

use crate::mail::{SmtpConnector, SmtpSession, TransportError};
use lettre::{
    address::Envelope,
    transport::smtp::{
        authentication::{Credentials, Mechanism},
        client::{AsyncSmtpConnection, TlsParameters},
        extension::ClientId,
    },
};
use secrecy::{ExposeSecret as _, SecretString};
use std::time::Duration;

/// Plain TCP connections upgraded with STARTTLS, via lettre.
#[derive(Debug, Clone)]
pub struct LettreConnector {
    timeout: Option<Duration>,
    hello_name: ClientId,
}

impl LettreConnector {
    pub fn new(timeout: Option<Duration>, hello_name: &str) -> Self {
        Self {
            timeout,
            hello_name: ClientId::Domain(hello_name.to_string()),
        }
    }
}

pub struct LettreSession {
    conn: AsyncSmtpConnection,
    host: String,
    hello_name: ClientId,
}

impl SmtpConnector for LettreConnector {
    type Session = LettreSession;

    async fn connect(&self, host: &str, port: u16) -> Result<LettreSession, TransportError> {
        // No implicit TLS. The channel is upgraded by starttls().
        let conn = AsyncSmtpConnection::connect_tokio1(
            (host, port),
            self.timeout,
            &self.hello_name,
            None,
            None,
        )
        .await?;
        Ok(LettreSession {
            conn,
            host: host.to_string(),
            hello_name: self.hello_name.clone(),
        })
    }
}

impl SmtpSession for LettreSession {
    async fn starttls(&mut self) -> Result<(), TransportError> {
        let params = TlsParameters::new(self.host.clone())?;
        self.conn.starttls(params, &self.hello_name).await?;
        Ok(())
    }

    async fn login(&mut self, username: &str, password: &SecretString) -> Result<(), TransportError> {
        let credentials = Credentials::new(
            username.to_string(),
            password.expose_secret().to_string(),
        );
        self.conn
            .auth(&[Mechanism::Plain, Mechanism::Login], &credentials)
            .await?;
        Ok(())
    }

    async fn send(&mut self, envelope: &Envelope, email: &[u8]) -> Result<(), TransportError> {
        self.conn.send(envelope, email).await?;
        Ok(())
    }

    async fn quit(&mut self) -> Result<(), TransportError> {
        self.conn.quit().await?;
        Ok(())
    }

    async fn abort(&mut self) {
        self.conn.abort().await;
    }
}

// vim: ts=4 sw=4 expandtab
