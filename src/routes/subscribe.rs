use actix_web::web;
use actix_web::HttpResponse;
use serde::de::value::StrDeserializer;
use serde::de::IntoDeserializer;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use super::clean_tags;
use crate::domain::SubscriberEmail;
use crate::domain::SubscriptionSource;
use crate::messages;
use crate::registry_client::RegistryClient;
use crate::subscription::process_subscription;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeBody {
    #[serde(default)]
    email: String,
    #[serde(default)]
    tag: Option<String>,
    /// Unknown sources are rejected when the body is deserialized
    #[serde(default, deserialize_with = "blank_as_none")]
    utm_source: Option<SubscriptionSource>,
}

/// Forms send `""` when no source is set
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<SubscriptionSource>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.trim().is_empty() => {
            let source: StrDeserializer<D::Error> = s.trim().into_deserializer();
            SubscriptionSource::deserialize(source).map(Some)
        }
        _ => Ok(None),
    }
}

/// Unlike the other routes, the subscribe form only reads `message` (and
/// `alreadySubscribed`), so there is no `success` field.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscribeResponse {
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    already_subscribed: Option<bool>,
}

/// `POST /api/subscribe`
///
/// ```sh
///     curl -X POST -H 'Content-Type: application/json' \
///         -d '{"email": "john@foo.com", "tag": "devops"}' \
///         http://127.0.0.1:8000/api/subscribe
/// ```
#[tracing::instrument(
    name = "Subscribing",
    skip(body, registry),
    fields(subscriber_email = %body.email)
)]
pub async fn subscribe(
    body: web::Json<SubscribeBody>,
    registry: web::Data<RegistryClient>,
) -> HttpResponse {
    let SubscribeBody {
        email,
        tag,
        utm_source,
    } = body.into_inner();

    let email = match SubscriberEmail::parse(email) {
        Ok(email) => email,
        Err(_) => {
            return HttpResponse::BadRequest().json(SubscribeResponse {
                message: messages::INVALID_EMAIL,
                already_subscribed: None,
            })
        }
    };

    let tags = clean_tags(tag);
    let result =
        process_subscription(&registry, &email, &tags, utm_source.unwrap_or_default()).await;

    let response = SubscribeResponse {
        message: result.message,
        already_subscribed: result.already_subscribed,
    };
    match result.success {
        true => HttpResponse::Ok().json(response),
        false => HttpResponse::InternalServerError().json(response),
    }
}
