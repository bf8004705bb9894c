pub mod email_client;
pub mod new_registration;
pub mod notifier;
pub mod registration_store;

pub use crate::domain::email_client::{EmailClient, NotificationError};
pub use crate::domain::new_registration::{NewRegistration, RegistrationId};
pub use crate::domain::notifier::{NotificationOutcome, Notifier};
pub use crate::domain::registration_store::{PersistenceError, RegistrationStore};
