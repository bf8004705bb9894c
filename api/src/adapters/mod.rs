mod dynamodb_registration_store;
mod postmark_email_client;

pub use crate::adapters::dynamodb_registration_store::DynamoDbRegistrationStore;
pub use crate::adapters::postmark_email_client::PostmarkEmailClient;
