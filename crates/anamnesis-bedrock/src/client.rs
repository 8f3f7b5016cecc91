use aws_sdk_bedrockruntime::Client;

/// Build a Bedrock Runtime client from the default AWS config chain, pinned to
/// `region` when one is given.
pub async fn build_client(region: Option<&str>) -> Client {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(aws_config::Region::new(region.to_string()));
    }
    Client::new(&loader.load().await)
}
