use std::fmt::Display;

use serde::Deserialize;
use serde::Serialize;

/// Where a subscription came from. Passed through to the registry as
/// `utm_source` for attribution, never stored by us.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionSource {
    #[default]
    LandingPage,
    LeadMagnet,
    Newsletter,
}

impl SubscriptionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionSource::LandingPage => "landing_page",
            SubscriptionSource::LeadMagnet => "lead_magnet",
            SubscriptionSource::Newsletter => "newsletter",
        }
    }
}

impl Display for SubscriptionSource {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
