use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::errors::AppError;
use crate::utils::oauth::TokenIssuer;

#[derive(Serialize)]
struct TokenResponse {
    access_token: String,
}

pub async fn issue_token(issuer: web::Data<TokenIssuer>) -> Result<HttpResponse, AppError> {
    let access_token = issuer.issue_token().await?;
    Ok(HttpResponse::Ok().json(TokenResponse { access_token }))
}
