use std::{fmt, future::Future};

use gloo_net::http::Request;
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

use super::{format_timestamp, Submission};
use crate::config::ContactConfig;

pub const WEBSITE_LABEL: &str = "Portfolio Contact Form";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("relay unreachable: {0}")]
    Network(String),
    #[error("relay rejected message ({status}): {message}")]
    Rejected { status: StatusCode, message: String },
}

/// Template variables the relay substitutes into the outgoing email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateParams {
    pub from_name: String,
    pub from_email: String,
    pub subject: String,
    pub message: String,
    pub to_name: String,
    pub reply_to: String,
    pub timestamp: String,
    pub website: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

/// Body of one send call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayRequest {
    pub service_id: String,
    pub template_id: String,
    #[serde(rename = "user_id")]
    pub public_key: String,
    pub template_params: TemplateParams,
}

impl RelayRequest {
    pub fn new(config: &ContactConfig, submission: &Submission, timestamp: String) -> Self {
        Self {
            service_id: config.service_id.clone(),
            template_id: config.template_id.clone(),
            public_key: config.public_key.clone(),
            template_params: TemplateParams {
                from_name: submission.name.clone(),
                from_email: submission.email.clone(),
                subject: submission.subject.clone(),
                message: submission.message.clone(),
                to_name: config.recipient_name.clone(),
                reply_to: submission.email.clone(),
                timestamp,
                website: WEBSITE_LABEL.to_string(),
                company: submission.company.clone(),
                service: submission.service.map(|s| s.name().to_string()),
            },
        }
    }

    pub fn stamped_now(config: &ContactConfig, submission: &Submission) -> Self {
        let now = chrono::Local::now().naive_local();
        Self::new(config, submission, format_timestamp(now))
    }
}

/// Outbound delivery seam. The browser build talks to EmailJS, tests swap in
/// a recorder.
pub trait Relay {
    fn send(&self, request: &RelayRequest) -> impl Future<Output = Result<(), DeliveryError>>;
}

/// Posts requests to the EmailJS REST endpoint.
#[derive(Debug, Clone)]
pub struct EmailJsRelay {
    endpoint: String,
}

impl EmailJsRelay {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl Relay for EmailJsRelay {
    async fn send(&self, request: &RelayRequest) -> Result<(), DeliveryError> {
        let response = Request::post(&self.endpoint)
            .json(request)
            .map_err(|e| DeliveryError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| DeliveryError::Network(e.to_string()))?;

        let status = response.status();
        let message = read_response(status, response.text().await)?;
        log::info!("relay response: {} {}", status, message);
        Ok(())
    }
}

/// Maps a relay reply to the delivery result. A body that cannot be read
/// still leaves its read error as the rejection message.
fn read_response<E: fmt::Display>(
    status: u16,
    body: Result<String, E>,
) -> Result<String, DeliveryError> {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = body.unwrap_or_else(|e| format!("unreadable response body: {e}"));
    if status.is_success() {
        Ok(message)
    } else {
        Err(DeliveryError::Rejected { status, message })
    }
}
