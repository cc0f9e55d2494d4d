//! AWS S3 client wrapper

use std::future::Future;

use anyhow::{Context, Result};
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;
use tokio_util::sync::CancellationToken;

use crate::s3::config::{ClientConfig, DEFAULT_REGION};
use crate::s3::download::ObjectContent;
use crate::s3::error::{translate, Failure, Outcome};
use crate::s3::transport;
use crate::s3::types::{to_chrono, Bucket, ObjectSummary};

/// Stateless handle over one provider connection.
///
/// Cheap to clone and safe to share between concurrent requests.
#[derive(Debug, Clone)]
pub struct StorageClient {
    client: Client,
    region: String,
}

impl StorageClient {
    /// Create a new S3 client from resolved configuration
    pub async fn new(config: &ClientConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(config.operation_timeout)
                    .build(),
            );

        if config.endpoint_url.is_some() {
            loader = loader.region(Region::new(config.region.clone()));
        } else {
            loader = loader.region(
                RegionProviderChain::default_provider().or_else(Region::new(config.region.clone())),
            );
        }

        if let Some(creds) = config.explicit_credentials() {
            loader = loader.credentials_provider(Credentials::new(
                &creds.access_key_id,
                &creds.secret_access_key,
                None,
                None,
                "s3-console-environment",
            ));
        }

        if let Some(http_client) =
            transport::http_client(config).context("Failed to build HTTP transport")?
        {
            loader = loader.http_client(http_client);
        }

        let sdk_config = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder
                .endpoint_url(endpoint)
                .force_path_style(config.force_path_style);
        }

        let region = sdk_config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| config.region.clone());

        tracing::info!(
            "S3 client ready: endpoint={}, region={}",
            config.endpoint_url.as_deref().unwrap_or("<default>"),
            region
        );

        Ok(Self {
            client: Client::from_conf(builder.build()),
            region,
        })
    }

    /// List all accessible buckets, in provider order
    pub async fn list_buckets(&self) -> Outcome<Vec<Bucket>> {
        let response = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| translate("ListBuckets", e))?;

        let buckets: Vec<Bucket> = response
            .buckets()
            .iter()
            .map(|b| Bucket {
                name: b.name().unwrap_or_default().to_string(),
                creation_date: b.creation_date().map(to_chrono),
            })
            .collect();

        tracing::debug!("Listed {} buckets", buckets.len());
        Ok(buckets)
    }

    /// Create a bucket. Fails if the name is taken, even by the caller.
    pub async fn create_bucket(&self, name: &str) -> Outcome<()> {
        let mut request = self.client.create_bucket().bucket(name);

        if self.region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        request
            .send()
            .await
            .map_err(|e| translate("CreateBucket", e))?;

        tracing::info!("Created bucket {}", name);
        Ok(())
    }

    /// Delete an empty bucket
    pub async fn delete_bucket(&self, name: &str) -> Outcome<()> {
        self.client
            .delete_bucket()
            .bucket(name)
            .send()
            .await
            .map_err(|e| translate("DeleteBucket", e))?;

        tracing::info!("Deleted bucket {}", name);
        Ok(())
    }

    /// List the objects of a bucket (first page only).
    ///
    /// An empty bucket yields an empty listing.
    pub async fn list_objects(&self, bucket: &str) -> Outcome<Vec<ObjectSummary>> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| translate("ListObjectsV2", e))?;

        if response.is_truncated().unwrap_or(false) {
            tracing::debug!("Listing of {} truncated, remaining keys not shown", bucket);
        }

        let objects = response
            .contents()
            .iter()
            .map(|obj| ObjectSummary {
                key: obj.key().unwrap_or_default().to_string(),
                size: obj.size().unwrap_or(0).max(0) as u64,
                last_modified: obj.last_modified().map(to_chrono),
                etag: obj.e_tag().map(|s| s.to_string()),
            })
            .collect();

        Ok(objects)
    }

    /// Open an object for download; the body is streamed, not buffered
    pub async fn get_object(&self, bucket: &str, key: &str) -> Outcome<ObjectContent> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| translate("GetObject", e))?;

        tracing::debug!(
            "Opened s3://{}/{} ({:?} bytes)",
            bucket,
            key,
            response.content_length()
        );

        Ok(ObjectContent {
            key: key.to_string(),
            content_length: response
                .content_length()
                .and_then(|len| u64::try_from(len).ok()),
            content_type: response.content_type().map(|s| s.to_string()),
            body: response.body,
        })
    }

    /// Region the client signs requests for
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Underlying SDK client, for collaborators outside the core
    pub fn sdk_client(&self) -> &Client {
        &self.client
    }
}

/// Run `operation` until it completes or `token` is cancelled
pub async fn cancellable<T, F>(token: &CancellationToken, operation: F) -> Outcome<T>
where
    F: Future<Output = Outcome<T>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(Failure::cancelled()),
        outcome = operation => outcome,
    }
}
