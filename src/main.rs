use std::sync::Arc;

use actix_web::middleware::{from_fn, Logger};
use actix_web::{web, App, HttpServer};
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_s3::Client as S3Client;
use dotenv::dotenv;
use log::info;

use peoplesuite::config::Config;
use peoplesuite::db::{DynamoProfileStore, ProfileStore};
use peoplesuite::handlers::photo::PhotoUploadConfig;
use peoplesuite::middleware::verify_token;
use peoplesuite::utils::aws::load_aws_config;
use peoplesuite::utils::jwt::TokenVerifier;
use peoplesuite::utils::oauth::TokenIssuer;
use peoplesuite::utils::s3::{PhotoStore, S3PhotoStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(std::io::Error::other)?;

    let aws_config = load_aws_config(&config.aws_region).await;
    let profiles: Arc<dyn ProfileStore> = Arc::new(DynamoProfileStore::new(
        DynamoClient::new(&aws_config),
        config.dynamodb_table.clone(),
    ));
    let photos: Arc<dyn PhotoStore> = Arc::new(S3PhotoStore::new(
        S3Client::new(&aws_config),
        config.s3_bucket.clone(),
        config.photo_url_expiry,
    ));

    let http = reqwest::Client::new();
    let issuer = web::Data::new(TokenIssuer::from_config(http.clone(), &config));
    let verifier = web::Data::new(TokenVerifier::from_config(http, &config));
    let profiles = web::Data::from(profiles);
    let photos = web::Data::from(photos);
    let upload_limits = web::Data::new(PhotoUploadConfig {
        max_bytes: config.max_photo_bytes,
    });

    info!("Starting server at {}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(from_fn(verify_token))
            .wrap(Logger::default())
            .app_data(issuer.clone())
            .app_data(verifier.clone())
            .app_data(profiles.clone())
            .app_data(photos.clone())
            .app_data(upload_limits.clone())
            .configure(peoplesuite::routes)
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
