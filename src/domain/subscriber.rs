use std::fmt::Display;

/// A subscriber record as held by the registry. Never stored locally; every
/// read goes back to the registry.
#[derive(Clone, Debug, PartialEq)]
pub struct Subscriber {
    /// Opaque id assigned by the registry
    pub id: String,
    pub email: String,
    /// Set semantics; order is whatever the registry returns
    pub tags: Vec<String>,
}

/// Marker tags applied by the backend itself (as opposed to tags requested by
/// the visitor)
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SubscriptionTag {
    /// Applied to every subscriber created through `process_subscription`
    NewSubscriber,
}

impl SubscriptionTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTag::NewSubscriber => "new",
        }
    }
}

impl Display for SubscriptionTag {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
