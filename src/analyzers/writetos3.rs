use aws_sdk_s3::primitives::ByteStream;
use serde::Serialize;

/// Serializes a value to JSON and uploads it to an S3 bucket with `application/json` content type.
pub async fn write_json_to_s3(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    value: &impl Serialize,
) -> anyhow::Result<()> {
    let body = serde_json::to_vec(value)?;
    write_bytes_to_s3(client, bucket, key, body, "application/json").await
}

/// Uploads raw bytes to an S3 bucket.
pub async fn write_bytes_to_s3(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    body: Vec<u8>,
    content_type: &str,
) -> anyhow::Result<()> {
    client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(body))
        .content_type(content_type)
        .send()
        .await?;

    Ok(())
}
