mod health_check;
mod lead_magnet;
mod resource_email;
mod subscribe;
mod unsubscribe;

use std::fmt::Debug;

use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::web;
use actix_web::HttpResponse;
use actix_web::ResponseError;
pub use health_check::*;
pub use lead_magnet::*;
pub use resource_email::*;
use serde::Serialize;
pub use subscribe::*;
pub use unsubscribe::*;

use crate::messages;
use crate::utils::error_chain_fmt;

/// Body shared by every JSON route except `/api/subscribe`
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: &'static str,
}

impl ApiResponse {
    pub fn success(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }

    pub fn failure(message: &'static str) -> Self {
        Self {
            success: false,
            message,
        }
    }
}

/// Handler errors. Each variant maps to a status and carries the message shown
/// to the user.
#[derive(thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("email delivery is not configured")]
    EmailNotConfigured,
    #[error("{0}")]
    Failed(&'static str),
}

impl Debug for ApiError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ApiError {
    fn message(&self) -> &'static str {
        match self {
            Self::Validation(message) | Self::Failed(message) => message,
            Self::EmailNotConfigured => messages::EMAIL_CONFIG_ERROR,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::EmailNotConfigured | Self::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiResponse::failure(self.message()))
    }
}

/// Bodies that cannot be deserialized (malformed JSON, wrong types, unknown
/// enum values) are answered with 400 instead of actix's plain text error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        tracing::warn!(error.message = %err, "Rejected malformed request body");
        let resp = HttpResponse::BadRequest().json(ApiResponse::failure(messages::INCOMPLETE_DATA));
        InternalError::from_response(err, resp).into()
    })
}

/// `true` if any of the required fields is missing or blank
fn any_blank(fields: &[&str]) -> bool { fields.iter().any(|f| f.trim().is_empty()) }

/// Requested tags, minus blank ones (the registry would reject them)
fn clean_tags(tags: impl IntoIterator<Item = String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
