use actix_web::web;
use actix_web::HttpResponse;
use serde::Deserialize;

use super::ApiError;
use super::ApiResponse;
use crate::domain::SubscriberEmail;
use crate::messages;
use crate::registry_client::RegistryClient;
use crate::subscription::process_unsubscription;
use crate::utils::redirect;

#[derive(Deserialize)]
pub struct UnsubscribeBody {
    #[serde(default)]
    email: String,
}

/// `POST /api/unsubscribe`, used by the unsubscribe form
#[tracing::instrument(
    name = "Unsubscribing",
    skip(body, registry),
    fields(subscriber_email = %body.email)
)]
pub async fn unsubscribe(
    body: web::Json<UnsubscribeBody>,
    registry: web::Data<RegistryClient>,
) -> Result<HttpResponse, ApiError> {
    let email = SubscriberEmail::parse(body.into_inner().email)
        .map_err(|_| ApiError::Validation(messages::INVALID_EMAIL))?;

    let result = process_unsubscription(&registry, &email).await;
    match result.success {
        true => Ok(HttpResponse::Ok().json(ApiResponse::success(result.message))),
        false => Err(ApiError::Failed(result.message)),
    }
}

/// `GET /api/unsubscribe?email=...`, the link in the `List-Unsubscribe`
/// header and email footers. The reader ends up on a page either way.
#[tracing::instrument(
    name = "Unsubscribing from link",
    skip(query, registry),
    fields(subscriber_email = %query.email)
)]
pub async fn unsubscribe_from_link(
    query: web::Query<UnsubscribeBody>,
    registry: web::Data<RegistryClient>,
) -> Result<HttpResponse, ApiError> {
    let email = SubscriberEmail::parse(query.into_inner().email)
        .map_err(|_| ApiError::Validation(messages::INVALID_EMAIL))?;

    let result = process_unsubscription(&registry, &email).await;
    match result.success {
        true => Ok(redirect(messages::UNSUBSCRIBE_SUCCESS_PAGE)),
        false => Ok(redirect(messages::NOT_FOUND_PAGE)),
    }
}
