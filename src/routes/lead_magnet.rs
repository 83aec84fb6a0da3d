use actix_web::web;
use actix_web::HttpResponse;
use serde::Deserialize;

use super::any_blank;
use super::clean_tags;
use super::ApiError;
use super::ApiResponse;
use crate::configuration::DeliverySettings;
use crate::delivery::resource_title;
use crate::delivery::resource_url;
use crate::delivery::ResourceDelivery;
use crate::delivery::ResourceNotifier;
use crate::domain::SubscriberEmail;
use crate::domain::SubscriptionSource;
use crate::messages;
use crate::registry_client::RegistryClient;
use crate::subscription::process_subscription;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadMagnetBody {
    #[serde(default)]
    email: String,
    #[serde(default)]
    resource_id: String,
    /// Google Drive file id of the resource
    #[serde(default)]
    file_id: String,
    #[serde(default)]
    tags: Vec<String>,
}

/// `POST /api/lead-magnet`
///
/// Subscribes the reader (tagged with `resource-{resourceId}`), then emails
/// them the resource from a background task once the configured delay has
/// passed. The response does not wait for the email.
#[tracing::instrument(
    name = "Requesting lead magnet",
    skip(body, registry, notifier, delivery),
    fields(subscriber_email = %body.email, resource_id = %body.resource_id)
)]
pub async fn lead_magnet(
    body: web::Json<LeadMagnetBody>,
    registry: web::Data<RegistryClient>,
    notifier: web::Data<ResourceNotifier>,
    delivery: web::Data<DeliverySettings>,
) -> Result<HttpResponse, ApiError> {
    if !notifier.is_configured() {
        tracing::error!("Lead magnet requested, but email delivery is not configured");
        return Err(ApiError::EmailNotConfigured);
    }

    let LeadMagnetBody {
        email,
        resource_id,
        file_id,
        tags,
    } = body.into_inner();

    if any_blank(&[&email, &resource_id, &file_id]) {
        return Err(ApiError::Validation(messages::INCOMPLETE_DATA));
    }
    let email = SubscriberEmail::parse(email)
        .map_err(|_| ApiError::Validation(messages::INVALID_EMAIL))?;

    let mut tags = clean_tags(tags);
    tags.push(format!("resource-{}", resource_id.trim()));

    let result =
        process_subscription(&registry, &email, &tags, SubscriptionSource::LeadMagnet).await;
    if !result.success {
        return Err(ApiError::Failed(result.message));
    }

    // the handle is dropped; the task reports its own outcome
    let _ = notifier.schedule_resource_notification(
        ResourceDelivery {
            email: email.as_ref().to_string(),
            resource_title: resource_title(&resource_id, None),
            resource_link: resource_url(file_id.trim()),
            resource_id,
        },
        delivery.lead_magnet_delay(),
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(messages::RESOURCE_SENT)))
}
