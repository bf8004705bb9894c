use crate::domain::email_client::EmailClient;
use crate::domain::new_registration::NewRegistration;
use std::sync::Arc;

const SUBJECT: &str = "New contact form submission";

/// Result of a notification attempt. Failures are reported here, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationOutcome {
    pub delivered: bool,
    pub detail: String,
}

impl NotificationOutcome {
    fn delivered(recipient: &str) -> Self {
        Self {
            delivered: true,
            detail: format!("Notification sent to {}", recipient),
        }
    }

    fn failed(detail: String) -> Self {
        Self {
            delivered: false,
            detail,
        }
    }
}

/// Best-effort delivery of registration notifications to the operator address.
pub struct Notifier {
    email_client: Arc<dyn EmailClient>,
    operator_email: String,
}

impl Notifier {
    pub fn new(email_client: Arc<dyn EmailClient>, operator_email: String) -> Self {
        Self {
            email_client,
            operator_email,
        }
    }

    #[tracing::instrument(
        name = "Notifying the operator of a new registration",
        skip(self, registration),
        fields(operator_email = %self.operator_email)
    )]
    pub async fn notify(&self, registration: &NewRegistration) -> NotificationOutcome {
        let subject = match registration.name() {
            "" => SUBJECT.to_string(),
            name => format!("{} from {}", SUBJECT, name),
        };

        let result = self
            .email_client
            .send_email_to(
                &self.operator_email,
                &subject,
                &html_body(registration),
                &text_body(registration),
            )
            .await;

        match result {
            Ok(()) => NotificationOutcome::delivered(&self.operator_email),
            Err(e) => {
                tracing::warn!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Failed to notify the operator, the registration is kept"
                );
                NotificationOutcome::failed(e.to_string())
            }
        }
    }
}

/// HTML body of the notification. User input is escaped before it is embedded.
pub fn html_body(registration: &NewRegistration) -> String {
    format!(
        r#"<html>
  <body style="font-family: Arial, sans-serif; color: #333;">
    <h2>New contact form submission</h2>
    <table cellpadding="6">
      <tr><td><strong>Name</strong></td><td>{}</td></tr>
      <tr><td><strong>Email</strong></td><td>{}</td></tr>
    </table>
    <h3>Message</h3>
    <p style="white-space: pre-wrap;">{}</p>
  </body>
</html>"#,
        escape_html(registration.name()),
        escape_html(registration.email()),
        escape_html(registration.message()),
    )
}

pub fn text_body(registration: &NewRegistration) -> String {
    format!(
        "New contact form submission\n\nName: {}\nEmail: {}\n\nMessage:\n{}\n",
        registration.name(),
        registration.email(),
        registration.message(),
    )
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}
