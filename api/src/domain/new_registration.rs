use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// A submitted name/email/message triple, before it is persisted.
///
/// No field is required and none is validated; absent fields stay `None`
/// all the way down to the store and the notification template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewRegistration {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

impl NewRegistration {
    pub fn new(name: Option<String>, email: Option<String>, message: Option<String>) -> Self {
        Self {
            name,
            email,
            message,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn email(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }
}

/// Opaque identifier assigned by the store on creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistrationId(String);

impl RegistrationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl AsRef<str> for RegistrationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for RegistrationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
