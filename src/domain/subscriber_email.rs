use validator::ValidateEmail;

/// An email address that has passed parsing. Used for senders and recipients
/// alike; the inner `String` is private so that `parse` cannot be bypassed.
#[derive(Clone, Debug, PartialEq)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    /// On top of the general format check, the domain must end with a suffix
    /// of at least two letters (`user@localhost` and `user@foo.c` are
    /// rejected).
    pub fn parse(email: String) -> Result<Self, String> {
        let email = email.trim().to_string();
        match ValidateEmail::validate_email(&email) && has_domain_suffix(&email) {
            true => Ok(Self(email)),
            false => Err(format!("Invalid email: {email:?}")),
        }
    }
}

fn has_domain_suffix(email: &str) -> bool {
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    match domain.rsplit_once('.') {
        Some((host, suffix)) => {
            !host.is_empty() && suffix.len() >= 2 && suffix.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str { &self.0 }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
