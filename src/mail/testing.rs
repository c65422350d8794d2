// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (C) 2026 Michael Büsch <m@bues.ch>

//! Recording SMTP double.

use crate::mail::{SmtpConnector, SmtpSession, TransportError};
use lettre::{Address, address::Envelope};
use secrecy::{ExposeSecret as _, SecretString};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Connect(String, u16),
    StartTls,
    Login(String, String),
    Send {
        from: Option<String>,
        to: Vec<String>,
        raw: String,
    },
    Quit,
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Connect,
    StartTls,
    Login,
    Send,
}

#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
    fail_at: Option<Step>,
}

impl Recorder {
    pub fn failing_at(step: Step) -> Self {
        Self {
            fail_at: Some(step),
            ..Default::default()
        }
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    fn check(&self, step: Step) -> Result<(), TransportError> {
        if self.fail_at == Some(step) {
            Err(format!("{step:?} rejected").into())
        } else {
            Ok(())
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

pub struct RecordingSession(Recorder);

impl SmtpSession for RecordingSession {
    async fn starttls(&mut self) -> Result<(), TransportError> {
        self.0.push(Event::StartTls);
        self.0.check(Step::StartTls)
    }

    async fn login(
        &mut self,
        username: &str,
        password: &SecretString,
    ) -> Result<(), TransportError> {
        self.0.push(Event::Login(
            username.to_string(),
            password.expose_secret().to_string(),
        ));
        self.0.check(Step::Login)
    }

    async fn send(&mut self, envelope: &Envelope, email: &[u8]) -> Result<(), TransportError> {
        self.0.push(Event::Send {
            from: envelope.from().map(ToString::to_string),
            to: envelope.to().iter().map(Address::to_string).collect(),
            raw: String::from_utf8_lossy(email).into_owned(),
        });
        self.0.check(Step::Send)
    }

    async fn quit(&mut self) -> Result<(), TransportError> {
        self.0.push(Event::Quit);
        Ok(())
    }

    async fn abort(&mut self) {
        self.0.push(Event::Abort);
    }
}

impl SmtpConnector for Recorder {
    type Session = RecordingSession;

    async fn connect(&self, host: &str, port: u16) -> Result<RecordingSession, TransportError> {
        self.push(Event::Connect(host.to_string(), port));
        self.check(Step::Connect)?;
        Ok(RecordingSession(self.clone()))
    }
}

// vim: ts=4 sw=4 expandtab
