// ============================================================================
// Syndic Infrastructure - HTTP Image Host
// File: crates/syndic-infrastructure/src/image_host/http_image_host.rs
// Description: Unsigned multipart uploads to a hosted image service
// ============================================================================

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info};

use syndic_core::error::DomainError;
use syndic_core::repositories::{ImageHost, ImageUpload, UploadedImage};
use syndic_shared::config::ImageHostSettings;

use crate::error::InfraError;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

pub struct HttpImageHost {
    client: Client,
    upload_url: String,
    upload_preset: String,
}

impl HttpImageHost {
    pub fn new(settings: &ImageHostSettings) -> Result<Self, InfraError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            upload_url: settings.upload_url.clone(),
            upload_preset: settings.upload_preset.clone(),
        })
    }
}

#[async_trait]
impl ImageHost for HttpImageHost {
    async fn upload(&self, image: ImageUpload) -> Result<UploadedImage, DomainError> {
        let size = image.bytes.len();
        let file = Part::bytes(image.bytes)
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
            .map_err(|e| DomainError::validation(format!("Invalid content type: {}", e)))?;
        let form = Form::new()
            .part("file", file)
            .text("upload_preset", self.upload_preset.clone());

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!("Image upload request failed: {}", e);
                DomainError::UploadFailed("request failed".to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Image host returned {}: {}", status, body);
            return Err(DomainError::UploadFailed(format!("HTTP {}", status.as_u16())));
        }

        let uploaded: UploadResponse = response.json().await.map_err(|e| {
            error!("Unexpected image host response: {}", e);
            DomainError::UploadFailed("invalid response".to_string())
        })?;

        info!("Uploaded {} ({} bytes) as {}", image.file_name, size, uploaded.public_id);
        Ok(UploadedImage {
            url: uploaded.secure_url,
            asset_id: uploaded.public_id,
        })
    }
}
