pub mod aws;
pub mod jwt;
pub mod oauth;
pub mod s3;
