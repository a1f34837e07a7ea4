use serde::{Deserialize, Serialize};

/// Stored profile. Field names match the DynamoDB item attributes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct EmployeeProfile {
    #[serde(rename = "EmployeeID")]
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub start_date: String,
    pub country: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NewProfile {
    pub first_name: String,
    pub last_name: String,
    pub start_date: String,
    pub country: String,
}

impl NewProfile {
    pub fn with_id(&self, employee_id: String) -> EmployeeProfile {
        EmployeeProfile {
            employee_id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            start_date: self.start_date.clone(),
            country: self.country.clone(),
        }
    }
}
