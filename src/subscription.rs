use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::future::join_all;
use futures::FutureExt;

use crate::domain::SubscriberEmail;
use crate::domain::SubscriptionResult;
use crate::domain::SubscriptionSource;
use crate::domain::SubscriptionTag;
use crate::messages;
use crate::registry_client::Creation;
use crate::registry_client::Lookup;
use crate::registry_client::RegistryClient;

/// Subscribe `email`, or update the tags of an existing subscriber.
///
/// Calling this repeatedly with the same email converges to a single registry
/// record carrying the union of all tags ever supplied: the registry is always
/// asked first, and only an unknown email is created (and marked with
/// `SubscriptionTag::NewSubscriber`).
///
/// Never fails; every outcome, including a panic inside the workflow, is
/// reported through `SubscriptionResult`.
#[tracing::instrument(
    name = "Processing subscription",
    skip(registry, email),
    fields(subscriber_email = %email, utm_source = %source)
)]
pub async fn process_subscription(
    registry: &RegistryClient,
    email: &SubscriberEmail,
    tags: &[String],
    source: SubscriptionSource,
) -> SubscriptionResult {
    guard_panics(subscribe_or_update(registry, email, tags, source)).await
}

/// A panic inside `workflow` becomes a server error result
async fn guard_panics(workflow: impl Future<Output = SubscriptionResult>) -> SubscriptionResult {
    match AssertUnwindSafe(workflow).catch_unwind().await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!("Subscription workflow panicked");
            SubscriptionResult::failure(messages::SERVER_ERROR)
        }
    }
}

async fn subscribe_or_update(
    registry: &RegistryClient,
    email: &SubscriberEmail,
    tags: &[String],
    source: SubscriptionSource,
) -> SubscriptionResult {
    if let Lookup::Found(subscriber) = registry.lookup_by_email(email).await {
        if !apply_tags(registry, &subscriber.id, tags.iter().map(String::as_str)).await {
            tracing::error!(subscriber_id = %subscriber.id, "Error updating subscriber tags");
            return SubscriptionResult::failure(messages::TAGS_UPDATE_ERROR);
        }
        tracing::info!(subscriber_id = %subscriber.id, "Existing subscriber updated");
        return SubscriptionResult::success(messages::SUBSCRIPTION_UPDATED)
            .with_subscriber(subscriber.id)
            .already_subscribed();
    }

    let subscriber = match registry.create(email, source).await {
        Creation::Created(subscriber) => subscriber,
        Creation::Failed => return SubscriptionResult::failure(messages::SUBSCRIPTION_ERROR),
    };

    let all_tags = std::iter::once(SubscriptionTag::NewSubscriber.as_str())
        .chain(tags.iter().map(String::as_str));
    if !apply_tags(registry, &subscriber.id, all_tags).await {
        tracing::error!(subscriber_id = %subscriber.id, "Error tagging new subscriber");
        return SubscriptionResult::failure(messages::TAGS_UPDATE_ERROR);
    }

    SubscriptionResult::success(messages::SUBSCRIPTION_NEW).with_subscriber(subscriber.id)
}

/// Tags are independent writes, so they are sent concurrently. `true` only if
/// every tag was accepted; an empty list trivially succeeds.
async fn apply_tags<'a>(
    registry: &RegistryClient,
    subscriber_id: &str,
    tags: impl Iterator<Item = &'a str>,
) -> bool {
    join_all(tags.map(|tag| registry.add_tag(subscriber_id, tag)))
        .await
        .into_iter()
        .all(|added| added)
}

/// Remove the registry record for `email`, if there is one.
#[tracing::instrument(
    name = "Processing unsubscription",
    skip(registry, email),
    fields(subscriber_email = %email)
)]
pub async fn process_unsubscription(
    registry: &RegistryClient,
    email: &SubscriberEmail,
) -> SubscriptionResult {
    let subscriber = match registry.lookup_by_email(email).await {
        Lookup::Found(subscriber) => subscriber,
        Lookup::NotFound => {
            tracing::warn!("Cannot unsubscribe an unknown email");
            return SubscriptionResult::failure(messages::EMAIL_NOT_SUBSCRIBED);
        }
    };

    match registry.remove(&subscriber.id).await {
        true => SubscriptionResult::success(messages::UNSUBSCRIPTION).with_subscriber(subscriber.id),
        false => SubscriptionResult::failure(messages::SERVER_ERROR),
    }
}
