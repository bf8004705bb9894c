use crate::domain::{NewRegistration, Notifier, PersistenceError, RegistrationStore};
use crate::registration_workflow::{register_and_notify, Registered};
use crate::utils::error_chain_fmt;
use actix_web::http::StatusCode;
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, ResponseError};
use anyhow::anyhow;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(thiserror::Error)]
pub enum RegisterError {
    #[error("Malformed request body")]
    MalformedBody(#[source] anyhow::Error),
    // The cause is logged by the root span, the caller only sees the generic message.
    #[error("Error registering user")]
    PersistenceError(#[from] PersistenceError),
}

impl std::fmt::Debug for RegisterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    status: u16,
    error: String,
}

impl ResponseError for RegisterError {
    fn status_code(&self) -> StatusCode {
        match self {
            RegisterError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            RegisterError::PersistenceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorBody {
            status: status.as_u16(),
            error: self.to_string(),
        })
    }
}

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

fn is_json(content_type: &str) -> bool {
    content_type.eq_ignore_ascii_case("application/json")
        || content_type
            .rsplit_once('+')
            .is_some_and(|(_, suffix)| suffix.eq_ignore_ascii_case("json"))
}

/// Registration fields as submitted. Every field is optional.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct RegistrationForm {
    #[serde(rename = "Name", default, deserialize_with = "coerce_to_text")]
    pub name: Option<String>,
    #[serde(rename = "Email", default, deserialize_with = "coerce_to_text")]
    pub email: Option<String>,
    #[serde(rename = "Message", default, deserialize_with = "coerce_to_text")]
    pub message: Option<String>,
}

impl RegistrationForm {
    /// Parse a JSON or urlencoded body.
    ///
    /// Bodies of any other content type, empty bodies and JSON arrays carry no
    /// fields and read as an empty form. Only unparseable JSON and bare JSON
    /// scalars are malformed.
    pub fn parse(content_type: &str, body: &[u8]) -> Result<Self, RegisterError> {
        if content_type.eq_ignore_ascii_case(FORM_URLENCODED) {
            return serde_urlencoded::from_bytes(body)
                .map_err(|e| RegisterError::MalformedBody(e.into()));
        }

        if !is_json(content_type) || body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let value: serde_json::Value =
            serde_json::from_slice(body).map_err(|e| RegisterError::MalformedBody(e.into()))?;
        match value {
            serde_json::Value::Object(_) => {
                serde_json::from_value(value).map_err(|e| RegisterError::MalformedBody(e.into()))
            }
            serde_json::Value::Array(_) => Ok(Self::default()),
            scalar => Err(RegisterError::MalformedBody(anyhow!(
                "Expected a JSON object or array, got {}",
                scalar
            ))),
        }
    }
}

/// Scalars become their text form, `null` counts as absent, and compound
/// values are kept as their JSON text.
fn coerce_to_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

impl From<RegistrationForm> for NewRegistration {
    fn from(form: RegistrationForm) -> Self {
        NewRegistration::new(form.name, form.email, form.message)
    }
}

#[derive(Serialize)]
struct RegisteredResponse<'a> {
    status: u16,
    message: &'static str,
    #[serde(rename = "emailSent")]
    email_sent: bool,
    user: EchoedUser<'a>,
}

#[derive(Serialize)]
struct EchoedUser<'a> {
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(rename = "Email", skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
}

impl<'a> From<&'a Registered> for RegisteredResponse<'a> {
    fn from(registered: &'a Registered) -> Self {
        Self {
            status: StatusCode::CREATED.as_u16(),
            message: "User registered successfully",
            email_sent: registered.notification.delivered,
            user: EchoedUser {
                name: registered.registration.name.as_deref(),
                email: registered.registration.email.as_deref(),
            },
        }
    }
}

#[tracing::instrument(
    name = "Handling a registration request",
    skip(request, body, store, notifier),
    fields(
        registration_name = tracing::field::Empty,
        registration_email = tracing::field::Empty
    )
)]
pub async fn register(
    request: HttpRequest,
    body: web::Bytes,
    store: web::Data<dyn RegistrationStore>,
    notifier: web::Data<Notifier>,
) -> Result<HttpResponse, RegisterError> {
    let new_registration: NewRegistration =
        RegistrationForm::parse(request.content_type(), &body)?.into();

    let span = tracing::Span::current();
    span.record("registration_name", new_registration.name());
    span.record("registration_email", new_registration.email());

    let registered =
        register_and_notify(store.get_ref(), notifier.get_ref(), new_registration).await?;

    Ok(HttpResponse::Created().json(RegisteredResponse::from(&registered)))
}
