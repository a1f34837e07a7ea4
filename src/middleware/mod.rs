use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{web, Error, HttpMessage, ResponseError};
use log::{debug, error};

use crate::errors::AppError;
use crate::utils::jwt::{bearer_token, Claims, TokenVerifier};
use crate::TOKEN_PATH;

/// Paths served without a bearer token.
pub const PUBLIC_PATHS: &[&str] = &[TOKEN_PATH];

/// Rejects requests without a valid bearer token, except on [`PUBLIC_PATHS`].
/// Verified claims are stored in the request extensions.
pub async fn verify_token(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    if PUBLIC_PATHS.contains(&req.path()) {
        return next.call(req).await.map(ServiceResponse::map_into_left_body);
    }

    match authenticate(&req).await {
        Ok(claims) => {
            debug!("Token accepted for {}", claims.sub.as_deref().unwrap_or("-"));
            req.extensions_mut().insert(claims);
            next.call(req).await.map(ServiceResponse::map_into_left_body)
        }
        Err(err) => {
            error!("{err}");
            let response = err.error_response();
            Ok(req.into_response(response).map_into_right_body())
        }
    }
}

async fn authenticate(req: &ServiceRequest) -> Result<Claims, AppError> {
    let verifier = req
        .app_data::<web::Data<TokenVerifier>>()
        .ok_or_else(|| AppError::InternalServerError("Token verifier not configured".to_string()))?;

    let header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Unauthorized("Missing access token".to_string()))?;

    let token = header
        .to_str()
        .ok()
        .and_then(bearer_token)
        .ok_or_else(|| AppError::Unauthorized("Invalid token format".to_string()))?;

    verifier.verify(token).await.map_err(|err| {
        debug!("Token rejected: {err}");
        AppError::from(err)
    })
}
