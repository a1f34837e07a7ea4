use aws_config::BehaviorVersion;
use aws_config::ConfigLoader;
use aws_config::SdkConfig;
use aws_types::region::Region;

/// Shared SDK config for the DynamoDB and S3 clients.
pub async fn load_aws_config(region: &str) -> SdkConfig {
    ConfigLoader::default()
        .region(Region::new(region.to_owned()))
        .behavior_version(BehaviorVersion::latest())
        .load()
        .await
}
