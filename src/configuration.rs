use std::env;
use std::env::current_dir;
use std::fmt::Display;
use std::time::Duration;

use config::Config;
use config::ConfigError;
use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::domain::SubscriberEmail;
use crate::email_client::EmailClient;
use crate::registry_client::RegistryClient;

/// Global configuration, loaded from the yaml files in `configuration/`. See
/// `get_configuration`.
#[derive(Clone, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub registry: RegistrySettings,
    pub email_client: EmailClientSettings,
    pub site: SiteSettings,
    pub delivery: DeliverySettings,
}

/// Server configuration
#[derive(Clone, Deserialize)]
pub struct ApplicationSettings {
    /// Should be localhost on dev machine, 0.0.0.0 on prod
    pub host: String,

    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

/// Subscriber registry (the email-marketing platform holding subscribers and
/// their tags)
#[derive(Clone, Deserialize)]
pub struct RegistrySettings {
    /// Versioned API root, e.g. `https://api.beehiiv.com/v2`
    pub base_url: String,
    pub publication_id: String,
    pub api_key: Secret<String>,
}

impl RegistrySettings {
    pub fn client(self) -> RegistryClient {
        RegistryClient::new(self.base_url, self.publication_id, self.api_key)
    }
}

/// Transactional mail API used for resource emails
#[derive(Clone, Deserialize)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub sender_email: String,
    pub authorization_token: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl EmailClientSettings {
    pub fn sender(&self) -> Result<SubscriberEmail, String> {
        SubscriberEmail::parse(self.sender_email.clone())
    }

    pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_milliseconds) }

    pub fn client(self) -> Result<EmailClient, anyhow::Error> {
        let sender = self.sender().map_err(anyhow::Error::msg)?;
        let timeout = self.timeout();
        let client = EmailClient::new(
            self.base_url,
            sender,
            self.authorization_token,
            timeout,
        )?;
        Ok(client)
    }
}

/// Site metadata, embedded in outgoing emails
#[derive(Clone, Deserialize)]
pub struct SiteSettings {
    pub title: String,
    pub author: String,
    /// Public URL of the blog, without trailing slash
    pub url: String,
    pub domain: String,
    /// Reply-to address for outgoing emails
    pub mail: String,
}

#[derive(Clone, Deserialize)]
pub struct DeliverySettings {
    /// How long the lead magnet email waits, so that it lands after the
    /// registry's welcome email. At least one minute.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub lead_magnet_delay_minutes: u64,

    /// Exact delay, bypassing the one minute minimum. Never read from the
    /// configuration files; only set by tests.
    #[serde(skip)]
    pub lead_magnet_delay_override: Option<Duration>,
}

impl DeliverySettings {
    pub const MIN_LEAD_MAGNET_DELAY_MINUTES: u64 = 1;

    pub fn lead_magnet_delay(&self) -> Duration {
        if let Some(delay) = self.lead_magnet_delay_override {
            return delay;
        }
        let minutes = match self.lead_magnet_delay_minutes {
            m if m < Self::MIN_LEAD_MAGNET_DELAY_MINUTES => {
                tracing::warn!(
                    configured = m,
                    "Lead magnet delay below the minimum, using {} minute",
                    Self::MIN_LEAD_MAGNET_DELAY_MINUTES
                );
                Self::MIN_LEAD_MAGNET_DELAY_MINUTES
            }
            m => m,
        };
        Duration::from_secs(minutes * 60)
    }
}

#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Display for Environment {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let env = match self {
            Environment::Local => "local",
            Environment::Production => "production",
        };
        write!(f, "{env}")
    }
}

impl TryFrom<String> for Environment {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            e => Err(format!(
                "{e} is not a supported environment; use `local` or `production`"
            )),
        }
    }
}

/// Load yaml configuration files at `<project_root>/configuration`:
/// `base.yaml`, then the file named after `APP_ENVIRONMENT` (`local` by
/// default), then `APP_*` env vars.
///
/// All fields must be present after merging, otherwise initialisation fails
/// and the server will not start.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let cfg_dir = current_dir()
        .map_err(|e| ConfigError::Message(format!("could not get current dir: {e}")))?
        .join("configuration");

    let env: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".to_string())
        .try_into()
        .map_err(ConfigError::Message)?;

    let settings = Config::builder()
        .add_source(config::File::from(cfg_dir.join("base.yaml")))
        .add_source(config::File::from(cfg_dir.join(format!("{env}.yaml"))))
        .add_source(
            // env vars are -always- parsed as String, hence `serde-aux` for the
            // numeric fields
            //
            // `APP_REGISTRY__API_KEY=...` -> `Settings.registry.api_key`
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
