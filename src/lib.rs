pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod utils;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::errors::AppError;

pub const TOKEN_PATH: &str = "/peoplesuite/oauth2/token";

/// Registers every route. The caller supplies the stores, token issuer and
/// verifier as app data and wraps the app in [`middleware::verify_token`].
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .service(
            web::resource(TOKEN_PATH).route(web::post().to(handlers::token::issue_token)),
        )
        .service(
            web::resource("/peoplesuite/apis/employees/profile")
                .route(web::post().to(handlers::profile::create_profile)),
        )
        .service(
            web::resource("/peoplesuite/apis/employees/{employee_id}/profile")
                .route(web::get().to(handlers::profile::get_profile)),
        )
        .service(
            web::resource("/peoplesuite/apis/employees/{employee_id}/photo")
                .route(web::get().to(handlers::photo::get_photo_url))
                .route(web::post().to(handlers::photo::upload_photo)),
        );
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}
