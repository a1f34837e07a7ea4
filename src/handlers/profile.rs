use actix_web::{web, HttpResponse};
use log::error;
use serde::Serialize;

use crate::db::{self, ProfileStore};
use crate::errors::AppError;
use crate::models::employee::NewProfile;

#[derive(Serialize)]
struct ProfileCreatedResponse {
    message: &'static str,
    #[serde(rename = "EmployeeID")]
    employee_id: String,
}

pub async fn create_profile(
    store: web::Data<dyn ProfileStore>,
    new_profile: web::Json<NewProfile>,
) -> Result<HttpResponse, AppError> {
    let profile = db::create_profile(store.get_ref(), &new_profile)
        .await
        .map_err(|err| {
            error!("Error creating profile: {err}");
            AppError::internal()
        })?;

    Ok(HttpResponse::Created().json(ProfileCreatedResponse {
        message: "Profile created",
        employee_id: profile.employee_id,
    }))
}

pub async fn get_profile(
    store: web::Data<dyn ProfileStore>,
    employee_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let employee_id = employee_id.into_inner();

    match store.get(&employee_id).await {
        Ok(Some(profile)) => Ok(HttpResponse::Ok().json(profile)),
        Ok(None) => Err(AppError::NotFound("Employee not found".to_string())),
        Err(err) => {
            error!("Error fetching profile: {err}");
            Err(AppError::internal())
        }
    }
}
