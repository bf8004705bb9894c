use crate::domain::{NewRegistration, PersistenceError, RegistrationId, RegistrationStore};
use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use chrono::Utc;
use std::time::Duration;
use telemetry::get_trace_and_span_id;

#[derive(Debug, Clone)]
pub struct DynamoDbRegistrationStore {
    client: Client,
    table_name: String,
    timeout: Duration,
}

impl DynamoDbRegistrationStore {
    pub fn new(client: Client, table_name: String, timeout: Duration) -> Self {
        Self {
            client,
            table_name,
            timeout,
        }
    }
}

#[async_trait]
impl RegistrationStore for DynamoDbRegistrationStore {
    #[tracing::instrument(
        name = "Inserting registration record",
        skip(self, registration)
    )]
    async fn create(
        &self,
        registration: &NewRegistration,
    ) -> Result<RegistrationId, PersistenceError> {
        let registration_id = RegistrationId::generate();

        let mut put_res_builder = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .item("PK", AttributeValue::S(registration_id.to_string()))
            .item("Type", AttributeValue::S("Registration".to_string()))
            .item("CreatedAt", AttributeValue::S(Utc::now().to_rfc3339()))
            .condition_expression("attribute_not_exists(PK)".to_string());

        // Absent fields are left out of the item instead of being stored empty.
        for (attribute, value) in [
            ("Name", &registration.name),
            ("Email", &registration.email),
            ("Message", &registration.message),
        ] {
            if let Some(value) = value {
                put_res_builder = put_res_builder.item(attribute, AttributeValue::S(value.clone()));
            }
        }

        if let Some((trace_id, span_id)) = get_trace_and_span_id() {
            put_res_builder = put_res_builder
                .item("TraceParent", AttributeValue::S(trace_id))
                .item("ParentSpan", AttributeValue::S(span_id));
        }

        let Ok(put_result) = tokio::time::timeout(self.timeout, put_res_builder.send()).await
        else {
            tracing::error!(
                "DynamoDB did not answer within {:?}. Using table {}",
                self.timeout,
                &self.table_name
            );
            return Err(PersistenceError::Timeout(self.timeout));
        };

        put_result
            .map_err(|e| {
                tracing::error!("Failed to execute PutItem: {:?}", e);
                e
            })
            .context(format!(
                "Failure inserting record to DynamoDB. Using table {}",
                &self.table_name
            ))?;

        Ok(registration_id)
    }
}
