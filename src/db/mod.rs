pub mod dynamodb;

use async_trait::async_trait;
use log::{info, warn};
use rand::Rng;

use crate::errors::StoreError;
use crate::models::employee::{EmployeeProfile, NewProfile};

pub use dynamodb::DynamoProfileStore;

pub const EMPLOYEE_ID_MIN: u32 = 1_000_000;
pub const EMPLOYEE_ID_MAX: u32 = 9_999_999;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, employee_id: &str) -> Result<Option<EmployeeProfile>, StoreError>;

    /// Writes `profile` only if its id is unused. Returns `false` when the id is taken.
    async fn insert_if_absent(&self, profile: &EmployeeProfile) -> Result<bool, StoreError>;
}

pub fn random_employee_id() -> String {
    rand::thread_rng()
        .gen_range(EMPLOYEE_ID_MIN..=EMPLOYEE_ID_MAX)
        .to_string()
}

/// Stores `fields` under a freshly sampled id, resampling until the conditional write lands.
pub async fn create_profile(
    store: &dyn ProfileStore,
    fields: &NewProfile,
) -> Result<EmployeeProfile, StoreError> {
    loop {
        let profile = fields.with_id(random_employee_id());
        if store.insert_if_absent(&profile).await? {
            info!("Generated Employee ID: {}", profile.employee_id);
            return Ok(profile);
        }
        warn!("Employee ID {} already taken, resampling", profile.employee_id);
    }
}
