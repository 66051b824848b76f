use serde::{Deserialize, Serialize};

/// Identity yielded by the external identity provider after authentication.
///
/// The core never checks credentials; it only consumes the opaque identity
/// (subject id, domain-qualified email, verification flag).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    subject: String,
    email: String,
    email_verified: bool,
    display_name: Option<String>,
}

impl UserIdentity {
    /// Creates a user identity from identity-provider data.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        email: impl Into<String>,
        email_verified: bool,
        display_name: Option<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            email: email.into(),
            email_verified,
            display_name,
        }
    }

    /// Returns the stable subject id from the identity provider.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the authenticated email address.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns whether the provider has verified the email address.
    #[must_use]
    pub fn email_verified(&self) -> bool {
        self.email_verified
    }

    /// Returns the display name, if the provider returned one.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}
