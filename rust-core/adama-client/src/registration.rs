// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Service registration.
//!
//! Registering a module is two phases:
//!
//! 1. **Submit**: package the repository around the module, upload it to
//!    `POST /{namespace}/services` and check the envelope. This yields a
//!    [`Registration`] for the new service.
//! 2. **Wait**: poll the service record until the server reports it ready
//!    or failed, or until the deadline passes. Polling is a plain
//!    sleep-and-retry loop at a fixed interval.
//!
//! [`Namespace::add_service`] runs both phases unless the caller asks for an
//! asynchronous registration, in which case the unverified handle is
//! returned right after submission.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use adama_archive::{CodePackage, ARCHIVE_NAME};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::check_envelope;
use crate::error::{AdamaError, Result};
use crate::namespace::Namespace;
use crate::service::{Service, ServiceState};
use crate::transport::FilePart;

/// How [`Namespace::add_service`] should wait for the new service.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegisterOptions {
    /// Return as soon as the upload is accepted.
    pub asynchronous: bool,
    /// Deadline for a blocking registration; the client's configured
    /// timeout when `None`.
    pub timeout: Option<Duration>,
}

impl RegisterOptions {
    pub fn blocking(timeout: Duration) -> Self {
        Self {
            asynchronous: false,
            timeout: Some(timeout),
        }
    }

    pub fn asynchronous() -> Self {
        Self {
            asynchronous: true,
            timeout: None,
        }
    }
}

/// Progress of a submitted registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationStatus {
    /// The server has not published the service yet.
    Pending,
    /// The service record is available.
    Ready,
    /// The server gave up; carries its message.
    Failed(String),
}

/// A service whose upload was accepted but which may still be provisioning.
#[derive(Debug, Clone)]
pub struct Registration {
    service: Service,
    started: Instant,
}

impl Registration {
    fn new(service: Service, started: Instant) -> Self {
        Self { service, started }
    }

    /// Check once whether the service has come up.
    pub fn poll(&mut self) -> Result<RegistrationStatus> {
        Ok(match self.service.ensure_loaded()? {
            ServiceState::Loaded(_) => RegistrationStatus::Ready,
            ServiceState::Errored(message) => RegistrationStatus::Failed(message.clone()),
            ServiceState::Unloaded => RegistrationStatus::Pending,
        })
    }

    /// Poll every `interval` until the service is ready.
    ///
    /// The deadline is measured from the start of submission, not from this
    /// call.
    ///
    /// # Errors
    ///
    /// - [`AdamaError::Api`] with the server's message if registration failed.
    /// - [`AdamaError::Timeout`] once `timeout` has elapsed.
    pub fn wait(mut self, timeout: Duration, interval: Duration) -> Result<Service> {
        loop {
            match self.poll()? {
                RegistrationStatus::Ready => {
                    info!(
                        service = %self.service.full_name(),
                        elapsed_ms = self.started.elapsed().as_millis() as u64,
                        "service registered"
                    );
                    return Ok(self.service);
                }
                RegistrationStatus::Failed(message) => return Err(AdamaError::api(message)),
                RegistrationStatus::Pending => {}
            }

            let elapsed = self.started.elapsed();
            if elapsed >= timeout {
                warn!(service = %self.service.full_name(), ?elapsed, "registration timed out");
                return Err(AdamaError::Timeout { elapsed });
            }
            debug!(service = %self.service.full_name(), "registration pending");
            thread::sleep(interval.min(timeout - elapsed));
        }
    }

    /// The handle being registered.
    pub fn service(&self) -> &Service {
        &self.service
    }

    pub fn into_service(self) -> Service {
        self.service
    }
}

impl Namespace {
    /// Upload the repository containing `module` as a new service.
    ///
    /// # Errors
    ///
    /// - [`AdamaError::Archive`] if `module` is outside a repository or no
    ///   descriptor lies between it and the repository root.
    /// - [`AdamaError::Api`] with the raw text when the server's answer is
    ///   not JSON, or with its message when the envelope reports failure.
    pub fn submit_service(&self, module: &Path) -> Result<Registration> {
        let started = Instant::now();
        let package = CodePackage::collect(module)?;
        let service_type = package.metadata.service_type.clone();
        info!(
            namespace = %self.name(),
            service = %package.metadata.name,
            kind = %service_type,
            bytes = package.archive.len(),
            "submitting service"
        );

        let response = self.client().post(
            &format!("{}/services", self.path()),
            &[
                ("type", service_type.as_str()),
                ("metadata", package.metadata_dir.as_str()),
            ],
            vec![FilePart::new("code", ARCHIVE_NAME, package.archive)],
        )?;
        let envelope: Value = match response.json() {
            Ok(envelope) => envelope,
            Err(_) => return Err(AdamaError::api(response.text())),
        };
        check_envelope(envelope)?;

        let version = package
            .metadata
            .version
            .unwrap_or_else(|| self.client().config().default_version.clone());
        let service = Service::new(
            self.client().clone(),
            self.name(),
            &package.metadata.name,
            version,
        );
        Ok(Registration::new(service, started))
    }

    /// Register `module` and, unless asked not to, wait for the service.
    ///
    /// The timeout covers the whole call: packing and upload count against
    /// it, and the service is polled at least once after the upload.
    pub fn add_service(&self, module: &Path, options: &RegisterOptions) -> Result<Service> {
        let registration = self.submit_service(module)?;
        if options.asynchronous {
            return Ok(registration.into_service());
        }

        let config = self.client().config();
        let timeout = options.timeout.unwrap_or(config.register_timeout);
        registration.wait(timeout, config.poll_interval)
    }
}
