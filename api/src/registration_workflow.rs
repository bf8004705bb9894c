use crate::domain::{
    NewRegistration, NotificationOutcome, Notifier, PersistenceError, RegistrationId,
    RegistrationStore,
};

/// Terminal state of a registration whose record was written.
#[derive(Debug)]
pub struct Registered {
    pub id: RegistrationId,
    pub registration: NewRegistration,
    pub notification: NotificationOutcome,
}

/// Persist the registration, then notify the operator.
///
/// A failed write ends the workflow before any email is attempted. Once the
/// write succeeded the notification outcome is only reported, never raised.
#[tracing::instrument(
    name = "Registering a new contact",
    skip(store, notifier, registration),
    fields(registration_id = tracing::field::Empty)
)]
pub async fn register_and_notify(
    store: &dyn RegistrationStore,
    notifier: &Notifier,
    registration: NewRegistration,
) -> Result<Registered, PersistenceError> {
    let id = store.create(&registration).await?;
    tracing::Span::current().record("registration_id", tracing::field::display(&id));

    let notification = notifier.notify(&registration).await;
    tracing::info!(
        email_sent = notification.delivered,
        "Registration {} stored",
        id
    );

    Ok(Registered {
        id,
        registration,
        notification,
    })
}
