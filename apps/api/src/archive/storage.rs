use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use tracing::{info, warn};

/// Uploads `text` as a `text/plain` object named `name` and returns its URL,
/// or `None` (logged) if the upload fails.
pub async fn upload_text(
    s3: &S3Client,
    bucket: &str,
    endpoint: &str,
    text: &str,
    name: &str,
) -> Option<String> {
    let result = s3
        .put_object()
        .bucket(bucket)
        .key(name)
        .content_type("text/plain; charset=utf-8")
        .body(ByteStream::from(text.as_bytes().to_vec()))
        .send()
        .await;

    match result {
        Ok(_) => {
            let url = object_url(endpoint, bucket, name);
            info!("Uploaded {name} to {url}");
            Some(url)
        }
        Err(e) => {
            warn!("Failed to upload {name}: {}", e.into_service_error());
            None
        }
    }
}

/// Path-style URL, which both MinIO and S3 accept.
pub fn object_url(endpoint: &str, bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url() {
        assert_eq!(
            object_url("http://localhost:9000/", "applications", "CV_Acme_20240101.txt"),
            "http://localhost:9000/applications/CV_Acme_20240101.txt"
        );
    }
}
