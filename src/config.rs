use std::env;
use std::time::Duration;
use url::Url;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_PHOTO_URL_EXPIRY_SECS: u64 = 3600;
const DEFAULT_JWKS_CACHE_SECS: u64 = 300;
const DEFAULT_MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;
/// S3 refuses presigned links that live longer than seven days.
const MAX_PHOTO_URL_EXPIRY_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{0} cannot be empty")]
    Empty(&'static str),
    #[error("{name} is not a valid URL: {value}")]
    InvalidUrl { name: &'static str, value: String },
    #[error("{name} must be a whole number, got {value}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
}

/// Runtime settings, read from the process environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub jwks_url: String,
    pub aws_region: String,
    pub s3_bucket: String,
    pub dynamodb_table: String,
    pub bind_addr: String,
    pub photo_url_expiry: Duration,
    pub max_photo_bytes: usize,
    pub jwks_cache_ttl: Duration,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            let value = lookup(name).ok_or(ConfigError::Missing(name))?;
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(name));
            }
            Ok(value)
        };
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let seconds = |name: &'static str, default: u64| -> Result<Duration, ConfigError> {
            match optional(name) {
                Some(value) => value
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| ConfigError::InvalidNumber { name, value }),
                None => Ok(Duration::from_secs(default)),
            }
        };

        let aws_region = required("AWS_REGION")?;

        let photo_url_expiry = seconds("PHOTO_URL_EXPIRY_SECS", DEFAULT_PHOTO_URL_EXPIRY_SECS)?;
        check_range(
            "PHOTO_URL_EXPIRY_SECS",
            photo_url_expiry.as_secs(),
            1,
            MAX_PHOTO_URL_EXPIRY_SECS,
        )?;

        let max_photo_bytes = match optional("MAX_PHOTO_BYTES") {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidNumber {
                    name: "MAX_PHOTO_BYTES",
                    value,
                })?,
            None => DEFAULT_MAX_PHOTO_BYTES,
        };
        check_range("MAX_PHOTO_BYTES", max_photo_bytes as u64, 1, u64::MAX)?;

        // An explicit endpoint wins over the Cognito hosted-domain convention.
        let token_url = match optional("TOKEN_URL") {
            Some(url) => url,
            None => {
                let domain = required("COGNITO_DOMAIN")?;
                format!("https://{domain}.auth.{aws_region}.amazoncognito.com/oauth2/token")
            }
        };
        let token_url = validate_url("TOKEN_URL", token_url)?;
        let jwks_url = validate_url("JWKS_URL", required("JWKS_URL")?)?;

        Ok(Self {
            client_id: required("CLIENT_ID")?,
            client_secret: required("CLIENT_SECRET")?,
            token_url,
            jwks_url,
            s3_bucket: required("S3_BUCKET")?,
            dynamodb_table: required("DYNAMO_DB_TABLE")?,
            aws_region,
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            photo_url_expiry,
            max_photo_bytes,
            jwks_cache_ttl: seconds("JWKS_CACHE_SECS", DEFAULT_JWKS_CACHE_SECS)?,
            jwt_issuer: optional("JWT_ISSUER"),
            jwt_audience: optional("JWT_AUDIENCE"),
        })
    }
}

fn check_range(name: &'static str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, value, min, max })
    }
}

fn validate_url(name: &'static str, value: String) -> Result<String, ConfigError> {
    match Url::parse(&value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(value),
        _ => Err(ConfigError::InvalidUrl { name, value }),
    }
}
