/// Outcome of a subscribe/unsubscribe workflow, built per request. `message`
/// is user-facing (see `crate::messages`).
#[derive(Clone, Debug, PartialEq)]
pub struct SubscriptionResult {
    pub success: bool,
    pub message: &'static str,
    pub subscriber_id: Option<String>,
    pub already_subscribed: Option<bool>,
}

impl SubscriptionResult {
    pub fn failure(message: &'static str) -> Self {
        Self {
            success: false,
            message,
            subscriber_id: None,
            already_subscribed: None,
        }
    }

    pub fn success(message: &'static str) -> Self {
        Self {
            success: true,
            ..Self::failure(message)
        }
    }

    pub fn with_subscriber(
        mut self,
        id: impl Into<String>,
    ) -> Self {
        self.subscriber_id = Some(id.into());
        self
    }

    pub fn already_subscribed(mut self) -> Self {
        self.already_subscribed = Some(true);
        self
    }

    /// `already_subscribed` is only ever set to `true`, so an unset field means
    /// a brand new subscriber
    pub fn is_already_subscribed(&self) -> bool { self.already_subscribed.unwrap_or(false) }
}
