use reqwest::Client;
use reqwest::RequestBuilder;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::Subscriber;
use crate::domain::SubscriberEmail;
use crate::domain::SubscriptionSource;

/// Thin client for the subscriber registry's HTTP API. Every method performs a
/// single request and folds transport errors, unexpected statuses and
/// malformed payloads into its return value, so callers never deal with
/// `reqwest::Error` directly.
///
/// Like `EmailClient`, one instance (and thus one connection pool) is built at
/// startup and shared via `web::Data`.
pub struct RegistryClient {
    http_client: Client,
    base_url: String,
    publication_id: String,
    api_key: Secret<String>,
}

#[derive(Debug, PartialEq)]
pub enum Lookup {
    Found(Subscriber),
    NotFound,
}

#[derive(Debug, PartialEq)]
pub enum Creation {
    Created(Subscriber),
    Failed,
}

/// Every registry endpoint we use answers with `{"data": {...subscriber}}`
#[derive(Deserialize)]
struct Envelope {
    data: Option<SubscriberData>,
}

#[derive(Deserialize)]
struct SubscriberData {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    email: Option<String>,
    // the registry may return tag objects rather than plain strings; only the
    // latter are kept
    #[serde(default)]
    tags: Vec<serde_json::Value>,
}

impl Envelope {
    /// A subscriber without an id is as good as no subscriber
    fn into_subscriber(self) -> Option<Subscriber> {
        let data = self.data?;
        let id = data.id.filter(|id| !id.trim().is_empty())?;
        Some(Subscriber {
            id,
            email: data.email.unwrap_or_default(),
            tags: data
                .tags
                .into_iter()
                .filter_map(|t| t.as_str().map(str::to_string))
                .collect(),
        })
    }
}

#[derive(Serialize)]
struct CreateSubscriptionRequest<'a> {
    email: &'a str,
    utm_source: &'a str,
    /// Previously removed subscribers are brought back instead of rejected
    reactivate_existing: bool,
    send_welcome_email: bool,
}

#[derive(Serialize)]
struct AddTagsRequest<'a> {
    tags: [&'a str; 1],
}

impl RegistryClient {
    pub fn new(
        base_url: String,
        publication_id: String,
        api_key: Secret<String>,
    ) -> Self {
        Self {
            // no timeout of our own; a hung registry holds the request open
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            publication_id,
            api_key,
        }
    }

    /// Requests without a publication or a key are bound to be rejected
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty()
            && !self.publication_id.trim().is_empty()
            && !self.api_key.expose_secret().trim().is_empty()
    }

    fn subscriptions_url(&self) -> String {
        format!(
            "{}/publications/{}/subscriptions",
            self.base_url, self.publication_id
        )
    }

    /// Send an authenticated request and extract the subscriber from the
    /// response envelope (if any). A 404 means no subscriber; any other
    /// non-2xx status is an error, whatever the body says.
    async fn fetch_subscriber(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<Subscriber>, reqwest::Error> {
        let resp = request
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let envelope = resp.error_for_status()?.json::<Envelope>().await?;
        Ok(envelope.into_subscriber())
    }

    /// `GET /subscriptions/by_email/{email}`. Fails open: any error is
    /// reported as `NotFound`.
    #[tracing::instrument(
        name = "Looking up subscriber by email",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    pub async fn lookup_by_email(
        &self,
        email: &SubscriberEmail,
    ) -> Lookup {
        let url = format!(
            "{}/by_email/{}",
            self.subscriptions_url(),
            urlencoding::encode(email.as_ref())
        );
        match self.fetch_subscriber(self.http_client.get(url)).await {
            Ok(Some(subscriber)) => {
                tracing::info!(subscriber_id = %subscriber.id, "Subscriber exists");
                Lookup::Found(subscriber)
            }
            Ok(None) => {
                tracing::info!("Subscriber not found");
                Lookup::NotFound
            }
            Err(e) => {
                tracing::warn!(error.cause_chain = ?e, "Registry lookup failed, assuming not found");
                Lookup::NotFound
            }
        }
    }

    /// `POST /subscriptions`
    #[tracing::instrument(
        name = "Creating subscriber",
        skip(self, email),
        fields(subscriber_email = %email, utm_source = %source)
    )]
    pub async fn create(
        &self,
        email: &SubscriberEmail,
        source: SubscriptionSource,
    ) -> Creation {
        let body = CreateSubscriptionRequest {
            email: email.as_ref(),
            utm_source: source.as_str(),
            reactivate_existing: true,
            send_welcome_email: true,
        };
        let request = self.http_client.post(self.subscriptions_url()).json(&body);
        match self.fetch_subscriber(request).await {
            Ok(Some(subscriber)) => {
                tracing::info!(subscriber_id = %subscriber.id, "New subscriber created");
                Creation::Created(subscriber)
            }
            Ok(None) => {
                tracing::error!("Registry response did not contain a subscriber id");
                Creation::Failed
            }
            Err(e) => {
                tracing::error!(error.cause_chain = ?e, "Could not create subscriber");
                Creation::Failed
            }
        }
    }

    /// `POST /subscriptions/{id}/tags`. A blank tag is refused without
    /// contacting the registry.
    #[tracing::instrument(name = "Adding tag to subscriber", skip(self))]
    pub async fn add_tag(
        &self,
        subscriber_id: &str,
        tag: &str,
    ) -> bool {
        if tag.trim().is_empty() {
            tracing::warn!("Empty tag not added");
            return false;
        }

        let url = format!("{}/{}/tags", self.subscriptions_url(), subscriber_id);
        let request = self
            .http_client
            .post(url)
            .json(&AddTagsRequest { tags: [tag] });
        match self.fetch_subscriber(request).await {
            Ok(Some(_)) => {
                tracing::info!("Tag added to subscriber");
                true
            }
            Ok(None) => {
                tracing::error!("Registry rejected tag");
                false
            }
            Err(e) => {
                tracing::error!(error.cause_chain = ?e, "Could not add tag to subscriber");
                false
            }
        }
    }

    /// `DELETE /subscriptions/{id}`. Only `204 No Content` counts as success.
    #[tracing::instrument(name = "Removing subscriber", skip(self))]
    pub async fn remove(
        &self,
        subscriber_id: &str,
    ) -> bool {
        let url = format!("{}/{}", self.subscriptions_url(), subscriber_id);
        let resp = match self
            .http_client
            .delete(url)
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!(error.cause_chain = ?e, "Could not remove subscriber");
                return false;
            }
        };

        let status = resp.status();
        if status == StatusCode::NO_CONTENT {
            tracing::info!("User unsubscribed successfully");
            return true;
        }

        let body = resp.text().await.unwrap_or_default();
        tracing::error!(%status, response = %body, "Registry refused to remove subscriber");
        false
    }
}
