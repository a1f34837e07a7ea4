use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;

use super::ProfileStore;
use crate::errors::StoreError;
use crate::models::employee::EmployeeProfile;

const EMPLOYEE_ID: &str = "EmployeeID";
const FIRST_NAME: &str = "FirstName";
const LAST_NAME: &str = "LastName";
const START_DATE: &str = "StartDate";
const COUNTRY: &str = "Country";

pub struct DynamoProfileStore {
    client: DynamoClient,
    table: String,
}

impl DynamoProfileStore {
    pub fn new(client: DynamoClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl ProfileStore for DynamoProfileStore {
    async fn get(&self, employee_id: &str) -> Result<Option<EmployeeProfile>, StoreError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(EMPLOYEE_ID, AttributeValue::S(employee_id.to_owned()))
            .send()
            .await
            .map_err(|err| StoreError::Backend(format!("DynamoDB get_item: {err}")))?;

        output.item().map(profile_from_item).transpose()
    }

    async fn insert_if_absent(&self, profile: &EmployeeProfile) -> Result<bool, StoreError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(profile_to_item(profile)))
            .condition_expression("attribute_not_exists(#id)")
            .expression_attribute_names("#id", EMPLOYEE_ID)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_conditional_check_failed_exception()) =>
            {
                Ok(false)
            }
            Err(err) => Err(StoreError::Backend(format!("DynamoDB put_item: {err}"))),
        }
    }
}

fn profile_to_item(profile: &EmployeeProfile) -> HashMap<String, AttributeValue> {
    [
        (EMPLOYEE_ID, &profile.employee_id),
        (FIRST_NAME, &profile.first_name),
        (LAST_NAME, &profile.last_name),
        (START_DATE, &profile.start_date),
        (COUNTRY, &profile.country),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), AttributeValue::S(value.clone())))
    .collect()
}

fn profile_from_item(item: &HashMap<String, AttributeValue>) -> Result<EmployeeProfile, StoreError> {
    let text = |name: &'static str| -> Result<String, StoreError> {
        item.get(name)
            .and_then(|value| value.as_s().ok())
            .cloned()
            .ok_or(StoreError::Malformed(name))
    };

    Ok(EmployeeProfile {
        employee_id: text(EMPLOYEE_ID)?,
        first_name: text(FIRST_NAME)?,
        last_name: text(LAST_NAME)?,
        start_date: text(START_DATE)?,
        country: text(COUNTRY)?,
    })
}
