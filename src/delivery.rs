use std::sync::Arc;
use std::time::Duration;

use chrono::Datelike;
use chrono::Utc;
use htmlescape::encode_attribute;
use htmlescape::encode_minimal;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::configuration::SiteSettings;
use crate::domain::SubscriberEmail;
use crate::email_client::EmailClient;
use crate::email_client::EmailHeader;

/// A resource (guide, template, ...) to be emailed to a reader. Fields are
/// raw user input and are only validated when the email is sent.
#[derive(Clone, Debug)]
pub struct ResourceDelivery {
    pub email: String,
    pub resource_id: String,
    pub resource_title: String,
    pub resource_link: String,
}

#[derive(thiserror::Error, Debug)]
pub enum DeliveryError {
    #[error("resource email for {resource_id} was not delivered")]
    NotDelivered { resource_id: String },
}

/// Title shown to the reader; falls back to the resource id
pub fn resource_title(
    resource_id: &str,
    custom: Option<&str>,
) -> String {
    match custom.map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => resource_id.to_string(),
    }
}

/// Public share link of a file hosted on Google Drive
pub fn resource_url(file_id: &str) -> String {
    format!("https://drive.google.com/file/d/{file_id}/view?usp=drive_link")
}

/// Sends resource emails, either right away or from a background task.
///
/// Cheap to clone: the email client is shared.
#[derive(Clone)]
pub struct ResourceNotifier {
    email_client: Arc<EmailClient>,
    site: SiteSettings,
}

impl ResourceNotifier {
    pub fn new(
        email_client: Arc<EmailClient>,
        site: SiteSettings,
    ) -> Self {
        Self { email_client, site }
    }

    pub fn is_configured(&self) -> bool { self.email_client.is_configured() }

    /// Single attempt. Incomplete or invalid input is rejected without a
    /// network call.
    #[tracing::instrument(
        name = "Sending resource email",
        skip_all,
        fields(resource_id = %options.resource_id)
    )]
    pub async fn send_resource_notification(
        &self,
        options: &ResourceDelivery,
    ) -> bool {
        if options.email.trim().is_empty() || options.resource_link.trim().is_empty() {
            tracing::error!(?options, "Incomplete data for resource email");
            return false;
        }
        let recipient = match SubscriberEmail::parse(options.email.clone()) {
            Ok(recipient) => recipient,
            Err(e) => {
                tracing::error!(error.message = %e, "Invalid resource email recipient");
                return false;
            }
        };

        let title = resource_title(&options.resource_id, Some(&options.resource_title));
        let subject = format!("Aquí tienes: {title}");
        let html_body = self.html_body(&title, &options.resource_link);
        let text_body = self.text_body(&title, &options.resource_link);

        match self
            .email_client
            .send_email(
                &recipient,
                &subject,
                &html_body,
                &text_body,
                Some(&self.site.mail),
                &self.headers(),
            )
            .await
        {
            Ok(()) => {
                tracing::info!(recipient = %recipient, "Resource email sent");
                true
            }
            Err(e) => {
                tracing::error!(
                    error.kind = e.kind(),
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Failed to send resource email"
                );
                false
            }
        }
    }

    /// Send the email after `delay` from a detached task. The caller may drop
    /// the handle; the task logs its own outcome either way.
    pub fn schedule_resource_notification(
        &self,
        options: ResourceDelivery,
        delay: Duration,
    ) -> JoinHandle<Result<(), DeliveryError>> {
        let notifier = self.clone();
        tracing::info!(
            resource_id = %options.resource_id,
            delay_seconds = delay.as_secs(),
            "Scheduling resource email"
        );
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match notifier.send_resource_notification(&options).await {
                true => {
                    tracing::info!(resource_id = %options.resource_id, "Delayed resource email sent");
                    Ok(())
                }
                false => {
                    tracing::error!(resource_id = %options.resource_id, "Delayed resource email failed");
                    Err(DeliveryError::NotDelivered {
                        resource_id: options.resource_id,
                    })
                }
            }
        })
    }

    fn headers(&self) -> Vec<EmailHeader> {
        vec![
            EmailHeader::new("Precedence", "bulk"),
            EmailHeader::new("X-Auto-Response-Suppress", "All"),
            EmailHeader::new("List-Unsubscribe", format!("<{}/unsubscribe>", self.site.url)),
            EmailHeader::new("X-Site-Origin", self.site.title.clone()),
            EmailHeader::new(
                "Message-ID",
                format!("<{}@{}>", Uuid::new_v4(), self.site.domain),
            ),
        ]
    }

    fn html_body(
        &self,
        title: &str,
        link: &str,
    ) -> String {
        let year = Utc::now().year();
        let title = encode_minimal(title);
        let href = encode_attribute(link);
        let link = encode_minimal(link);
        let author = encode_minimal(&self.site.author);
        let site_title = encode_minimal(&self.site.title);
        let site_href = encode_attribute(&self.site.url);
        let site_url = encode_minimal(&self.site.url);
        format!(
            r#"<div>
  <p>Hola,</p>
  <p>Aquí tienes tu {title}.</p>
  <p><a href="{href}">Ver</a></p>
  <p>Si el enlace no funciona, copia esta URL: {link}</p>
  <p>Un saludo,<br>{author}</p>
  <p>---</p>
  <p>© {year} {site_title} | <a href="{site_href}">{site_url}</a></p>
</div>"#
        )
    }

    fn text_body(
        &self,
        title: &str,
        link: &str,
    ) -> String {
        let year = Utc::now().year();
        format!(
            "Hola,\n\nAquí tienes tu {title}.\n\n{link}\n\nUn saludo,\n{}\n\n---\n© {year} {} | {}",
            self.site.author, self.site.title, self.site.url
        )
    }
}
