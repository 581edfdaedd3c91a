//! Image uploads ahead of issue reports

use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::DomainError;
use crate::repositories::{ImageHost, ImageUpload, UploadedImage};

pub struct ImageUploader<H: ImageHost + ?Sized> {
    host: Arc<H>,
}

impl<H: ImageHost + ?Sized> Clone for ImageUploader<H> {
    fn clone(&self) -> Self {
        Self { host: Arc::clone(&self.host) }
    }
}

impl<H: ImageHost + ?Sized> ImageUploader<H> {
    pub fn new(host: Arc<H>) -> Self {
        Self { host }
    }

    pub async fn upload_one(&self, image: ImageUpload) -> Result<UploadedImage, DomainError> {
        check(&image)?;
        let name = image.file_name.clone();
        self.host.upload(image).await.map_err(|e| {
            error!("Upload of {} failed: {}", name, e);
            match e {
                DomainError::UploadFailed(_) => e,
                other => DomainError::UploadFailed(other.to_string()),
            }
        })
    }

    /// Upload all images concurrently. Any single failure fails the batch,
    /// and the caller must not persist a record referencing partial uploads.
    pub async fn upload_many(&self, images: Vec<ImageUpload>) -> Result<Vec<UploadedImage>, DomainError> {
        if images.is_empty() {
            return Ok(Vec::new());
        }
        for image in &images {
            check(image)?;
        }

        let total = images.len();
        let results = join_all(images.into_iter().map(|image| self.host.upload(image))).await;

        let mut uploaded = Vec::with_capacity(total);
        let mut failed = 0;
        for result in results {
            match result {
                Ok(image) => uploaded.push(image),
                Err(e) => {
                    error!("Image upload failed: {}", e);
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            warn!("{} of {} images failed to upload", failed, total);
            return Err(DomainError::UploadFailed(format!("{} of {} images failed", failed, total)));
        }

        info!("Uploaded {} images", total);
        Ok(uploaded)
    }
}

fn check(image: &ImageUpload) -> Result<(), DomainError> {
    if !image.content_type.starts_with("image/") {
        return Err(DomainError::validation(format!(
            "{} is not an image ({})",
            image.file_name, image.content_type
        )));
    }
    if image.bytes.is_empty() {
        return Err(DomainError::validation(format!("{} is empty", image.file_name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MockImageHost;

    fn png(name: &str) -> ImageUpload {
        ImageUpload {
            file_name: name.to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        }
    }

    #[tokio::test]
    async fn test_upload_many_returns_urls_in_order() {
        let mut host = MockImageHost::new();
        host.expect_upload().times(2).returning(|image| {
            Ok(UploadedImage {
                url: format!("https://img.test/{}", image.file_name),
                asset_id: image.file_name,
            })
        });

        let uploader = ImageUploader::new(Arc::new(host));
        let uploaded = uploader.upload_many(vec![png("a.png"), png("b.png")]).await.unwrap();

        let urls: Vec<_> = uploaded.iter().map(|u| u.url.as_str()).collect();
        assert_eq!(urls, vec!["https://img.test/a.png", "https://img.test/b.png"]);
    }

    #[tokio::test]
    async fn test_one_failure_fails_the_batch() {
        let mut host = MockImageHost::new();
        host.expect_upload().times(3).returning(|image| {
            if image.file_name == "bad.png" {
                Err(DomainError::UploadFailed("HTTP 500".to_string()))
            } else {
                Ok(UploadedImage {
                    url: "https://img.test/ok".to_string(),
                    asset_id: "ok".to_string(),
                })
            }
        });

        let uploader = ImageUploader::new(Arc::new(host));
        let err = uploader
            .upload_many(vec![png("a.png"), png("bad.png"), png("c.png")])
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::UploadFailed("1 of 3 images failed".to_string()));
    }

    #[tokio::test]
    async fn test_rejects_non_images_without_calling_host() {
        let mut host = MockImageHost::new();
        host.expect_upload().never();

        let uploader = ImageUploader::new(Arc::new(host));
        let mut doc = png("notes.pdf");
        doc.content_type = "application/pdf".to_string();

        let err = uploader.upload_one(doc).await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_empty_batch_is_ok() {
        let uploader = ImageUploader::new(Arc::new(MockImageHost::new()));
        assert!(uploader.upload_many(Vec::new()).await.unwrap().is_empty());
    }
}
