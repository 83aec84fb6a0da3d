use std::time::Duration;

use reqwest::Client;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Serialize;

use crate::domain::SubscriberEmail;

/// Client for the transactional mail API (Postmark-style `POST /email`).
///
/// Establishing a HTTP connection is expensive, so a single `EmailClient` is
/// built at startup and shared (`web::Data` for handlers, `Arc` for background
/// tasks), reusing the connection pool held by `Client`.
pub struct EmailClient {
    http_client: Client,
    base_url: String,
    sender: SubscriberEmail,
    /// Display name shown next to the sender address
    sender_name: Option<String>,
    authorization_token: Secret<String>,
}

/// An extra header attached to an outgoing email
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EmailHeader {
    pub name: &'static str,
    pub value: String,
}

impl EmailHeader {
    pub fn new(
        name: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    headers: &'a [EmailHeader],
}

/// Why a dispatch failed, classified from the transport error so that logs
/// point at the likely culprit (credentials, network, provider)
#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    #[error("the mail provider rejected our credentials")]
    Authentication(#[source] reqwest::Error),
    #[error("could not connect to the mail provider")]
    Connection(#[source] reqwest::Error),
    #[error("the mail provider did not answer in time")]
    Timeout(#[source] reqwest::Error),
    #[error("the mail provider failed with {0}")]
    RemoteServer(StatusCode, #[source] reqwest::Error),
    #[error("the mail provider refused the email with {0}")]
    RemoteClient(StatusCode, #[source] reqwest::Error),
    #[error("unknown error while sending email")]
    Unknown(#[source] reqwest::Error),
}

impl DispatchError {
    /// Short label for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::Authentication(_) => "authentication",
            DispatchError::Connection(_) => "connection",
            DispatchError::Timeout(_) => "timeout",
            DispatchError::RemoteServer(..) => "remote_server",
            DispatchError::RemoteClient(..) => "remote_client",
            DispatchError::Unknown(_) => "unknown",
        }
    }
}

impl From<reqwest::Error> for DispatchError {
    fn from(e: reqwest::Error) -> Self {
        // order matters: a timed out connect attempt is both
        if e.is_timeout() {
            return DispatchError::Timeout(e);
        }
        if e.is_connect() {
            return DispatchError::Connection(e);
        }
        match e.status() {
            Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                DispatchError::Authentication(e)
            }
            Some(s) if s.is_server_error() => DispatchError::RemoteServer(s, e),
            Some(s) if s.is_client_error() => DispatchError::RemoteClient(s, e),
            _ => DispatchError::Unknown(e),
        }
    }
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: SubscriberEmail,
        authorization_token: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            sender,
            sender_name: None,
            authorization_token,
        })
    }

    pub fn with_sender_name(
        mut self,
        name: &str,
    ) -> Self {
        let name = name.replace('"', "");
        let name = name.trim();
        self.sender_name = (!name.is_empty()).then(|| name.to_string());
        self
    }

    /// `"Name" <address>`, or the bare address without a name
    fn from_field(&self) -> String {
        match &self.sender_name {
            Some(name) => format!("\"{name}\" <{}>", self.sender.as_ref()),
            None => self.sender.as_ref().to_string(),
        }
    }

    /// Without a base url and a token every dispatch is bound to fail, so
    /// routes that send email refuse early instead.
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty() && !self.authorization_token.expose_secret().trim().is_empty()
    }

    /// Single attempt; non-2xx responses are errors.
    #[tracing::instrument(
        name = "Dispatching email",
        skip(self, html_content, text_content, reply_to, headers),
        fields(recipient = %recipient)
    )]
    pub async fn send_email(
        &self,
        recipient: &SubscriberEmail,
        subject: &str,
        html_content: &str,
        text_content: &str,
        reply_to: Option<&str>,
        headers: &[EmailHeader],
    ) -> Result<(), DispatchError> {
        let url = format!("{}/email", self.base_url);
        let from = self.from_field();
        let body = SendEmailRequest {
            from: &from,
            to: recipient.as_ref(),
            subject,
            html_body: html_content,
            text_body: text_content,
            reply_to,
            headers,
        };
        self.http_client
            .post(url)
            .header(
                "X-Postmark-Server-Token",
                self.authorization_token.expose_secret(),
            )
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
