use actix_web::web;
use actix_web::HttpResponse;
use serde::Deserialize;

use super::any_blank;
use super::ApiError;
use super::ApiResponse;
use crate::delivery::resource_title;
use crate::delivery::ResourceDelivery;
use crate::delivery::ResourceNotifier;
use crate::domain::SubscriberEmail;
use crate::messages;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEmailBody {
    #[serde(default)]
    email: String,
    #[serde(default)]
    resource_id: String,
    #[serde(default)]
    resource_title: Option<String>,
    #[serde(default)]
    resource_link: String,
}

/// `POST /api/resource-email`: send a resource right away, without touching
/// the subscription.
#[tracing::instrument(
    name = "Sending resource email on request",
    skip(body, notifier),
    fields(subscriber_email = %body.email, resource_id = %body.resource_id)
)]
pub async fn resource_email(
    body: web::Json<ResourceEmailBody>,
    notifier: web::Data<ResourceNotifier>,
) -> Result<HttpResponse, ApiError> {
    if !notifier.is_configured() {
        tracing::error!("Resource email requested, but email delivery is not configured");
        return Err(ApiError::EmailNotConfigured);
    }

    let body = body.into_inner();
    if any_blank(&[&body.email, &body.resource_id, &body.resource_link]) {
        return Err(ApiError::Validation(messages::INCOMPLETE_DATA));
    }
    let email = SubscriberEmail::parse(body.email)
        .map_err(|_| ApiError::Validation(messages::INVALID_EMAIL))?;

    let options = ResourceDelivery {
        email: email.as_ref().to_string(),
        resource_title: resource_title(&body.resource_id, body.resource_title.as_deref()),
        resource_id: body.resource_id,
        resource_link: body.resource_link,
    };
    match notifier.send_resource_notification(&options).await {
        true => Ok(HttpResponse::Ok().json(ApiResponse::success(messages::EMAIL_SENT))),
        false => Err(ApiError::Failed(messages::SERVER_ERROR)),
    }
}
