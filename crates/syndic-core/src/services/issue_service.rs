// ============================================================================
// Syndic Core - Issue Service
// File: crates/syndic-core/src/services/issue_service.rs
// Description: Issue reports with attached images
// ============================================================================

use chrono::Utc;
use std::sync::Arc;
use syndic_shared::constants::{COLLECTION_ISSUES, DEFAULT_MAX_WRITE_ATTEMPTS};
use syndic_shared::new_id;
use tracing::info;
use validator::Validate;

use super::gateway::ArrayDocument;
use super::upload_service::ImageUploader;
use crate::domain::{Actor, Issue, IssueStatus, NewIssue};
use crate::error::DomainError;
use crate::repositories::{DocumentStore, ImageHost, ImageUpload};

const FIELD: &str = "issues";

pub struct IssueService<S: DocumentStore + ?Sized, H: ImageHost + ?Sized> {
    store: Arc<S>,
    uploader: ImageUploader<H>,
    max_write_attempts: u32,
}

impl<S: DocumentStore + ?Sized, H: ImageHost + ?Sized> IssueService<S, H> {
    pub fn new(store: Arc<S>, host: Arc<H>) -> Self {
        Self {
            store,
            uploader: ImageUploader::new(host),
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
        }
    }

    pub fn with_max_write_attempts(mut self, attempts: u32) -> Self {
        self.max_write_attempts = attempts;
        self
    }

    fn document(&self) -> ArrayDocument<'_, S> {
        ArrayDocument::new(self.store.as_ref(), COLLECTION_ISSUES, FIELD, self.max_write_attempts)
    }

    /// Any member may report. Images go up first; if one fails nothing is written.
    pub async fn report_issue(
        &self,
        actor: &Actor,
        apartment_id: &str,
        form: NewIssue,
        images: Vec<ImageUpload>,
    ) -> Result<Issue, DomainError> {
        actor.ensure_member(apartment_id)?;
        let form = NewIssue {
            description: form.description.trim().to_string(),
            ..form
        };
        form.validate()?;

        let uploaded = self.uploader.upload_many(images).await?;

        let now = Utc::now();
        let issue = Issue {
            id: new_id(),
            apartment_id: apartment_id.to_string(),
            issue_type: form.issue_type,
            description: form.description,
            reporter_name: actor.display_name.clone(),
            image_urls: uploaded.into_iter().map(|u| u.url).collect(),
            status: IssueStatus::Open,
            reported_by: actor.user_id.clone(),
            created_at: now,
            updated_at: now,
        };

        let entry = issue.clone();
        self.document()
            .mutate(apartment_id, move |items: &mut Vec<Issue>| {
                items.push(entry.clone());
                Ok(())
            })
            .await?;

        info!(
            "Issue {} ({}) reported in {} with {} images",
            issue.id,
            issue.issue_type.as_str(),
            apartment_id,
            issue.image_urls.len()
        );
        Ok(issue)
    }

    /// Newest first.
    pub async fn get_apartment_issues(&self, actor: &Actor, apartment_id: &str) -> Result<Vec<Issue>, DomainError> {
        actor.ensure_member(apartment_id)?;
        let mut issues: Vec<Issue> = self.document().load(apartment_id).await?;
        issues.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(issues)
    }

    pub async fn change_issue_status(
        &self,
        actor: &Actor,
        apartment_id: &str,
        issue_id: &str,
        status: IssueStatus,
    ) -> Result<Issue, DomainError> {
        actor.ensure_manager(apartment_id)?;

        let issue = self
            .document()
            .mutate(apartment_id, |items: &mut Vec<Issue>| {
                let issue = items
                    .iter_mut()
                    .find(|i| i.id == issue_id)
                    .ok_or_else(|| DomainError::not_found("Issue"))?;
                issue.status = status;
                issue.updated_at = Utc::now();
                Ok(issue.clone())
            })
            .await?;

        info!("Issue {} marked {}", issue_id, status.as_str());
        Ok(issue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IssueType;
    use crate::repositories::{MockImageHost, UploadedImage};
    use crate::services::testing::{resident, syndic, FakeStore};
    use chrono::Duration;

    fn leak(description: &str) -> NewIssue {
        NewIssue {
            issue_type: IssueType::Plumbing,
            description: description.to_string(),
        }
    }

    fn photo(name: &str) -> ImageUpload {
        ImageUpload {
            file_name: name.to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![0xff, 0xd8, 0xff],
        }
    }

    fn service(host: MockImageHost) -> (Arc<FakeStore>, IssueService<FakeStore, MockImageHost>) {
        let store = FakeStore::shared();
        let service = IssueService::new(Arc::clone(&store), Arc::new(host));
        (store, service)
    }

    #[tokio::test]
    async fn test_resident_reports_with_images() {
        let mut host = MockImageHost::new();
        host.expect_upload().times(2).returning(|image| {
            Ok(UploadedImage {
                url: format!("https://img.test/{}", image.file_name),
                asset_id: image.file_name,
            })
        });
        let (_store, service) = service(host);
        let reporter = resident("apt-1");

        let issue = service
            .report_issue(&reporter, "apt-1", leak("  Water under the sink  "), vec![photo("a.jpg"), photo("b.jpg")])
            .await
            .unwrap();
        assert_eq!(issue.description, "Water under the sink");
        assert_eq!(issue.reporter_name, "Rania");
        assert_eq!(issue.reported_by, "u-resident");
        assert_eq!(issue.status, IssueStatus::Open);
        assert_eq!(issue.image_urls, vec!["https://img.test/a.jpg", "https://img.test/b.jpg"]);

        let listed = service.get_apartment_issues(&reporter, "apt-1").await.unwrap();
        assert_eq!(listed, vec![issue]);
    }

    #[tokio::test]
    async fn test_failed_upload_writes_no_issue() {
        let mut host = MockImageHost::new();
        host.expect_upload().times(2).returning(|image| {
            if image.file_name == "bad.jpg" {
                Err(DomainError::UploadFailed("HTTP 500".to_string()))
            } else {
                Ok(UploadedImage {
                    url: "https://img.test/ok".to_string(),
                    asset_id: "ok".to_string(),
                })
            }
        });
        let (store, service) = service(host);

        let err = service
            .report_issue(&resident("apt-1"), "apt-1", leak("Broken light"), vec![photo("a.jpg"), photo("bad.jpg")])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UploadFailed(_)));
        assert_eq!(store.revision(COLLECTION_ISSUES, "apt-1"), None);
    }

    #[tokio::test]
    async fn test_invalid_report_skips_uploads() {
        let mut host = MockImageHost::new();
        host.expect_upload().never();
        let (store, service) = service(host);

        let err = service
            .report_issue(&resident("apt-1"), "apt-1", leak("   abc  "), vec![photo("a.jpg")])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));

        let err = service
            .report_issue(&resident("apt-2"), "apt-1", leak("Broken light"), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert_eq!(store.revision(COLLECTION_ISSUES, "apt-1"), None);
    }

    #[tokio::test]
    async fn test_newest_first() {
        let (_store, service) = service(MockImageHost::new());
        let reporter = resident("apt-1");
        let older = service.report_issue(&reporter, "apt-1", leak("Dripping tap"), Vec::new()).await.unwrap();
        let newer = service.report_issue(&reporter, "apt-1", leak("Door is stuck"), Vec::new()).await.unwrap();
        service
            .document()
            .mutate("apt-1", |items: &mut Vec<Issue>| {
                for item in items.iter_mut().filter(|i| i.id == older.id) {
                    item.created_at = item.created_at - Duration::hours(1);
                }
                Ok(())
            })
            .await
            .unwrap();

        let ids: Vec<_> = service
            .get_apartment_issues(&reporter, "apt-1")
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn test_only_the_syndic_changes_status() {
        let (_store, service) = service(MockImageHost::new());
        let issue = service
            .report_issue(&resident("apt-1"), "apt-1", leak("Elevator noise"), Vec::new())
            .await
            .unwrap();

        let err = service
            .change_issue_status(&resident("apt-1"), "apt-1", &issue.id, IssueStatus::Closed)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let updated = service
            .change_issue_status(&syndic("apt-1"), "apt-1", &issue.id, IssueStatus::Closed)
            .await
            .unwrap();
        assert_eq!(updated.status, IssueStatus::Closed);
        assert!(updated.updated_at >= issue.updated_at);

        let err = service
            .change_issue_status(&syndic("apt-1"), "apt-1", "missing", IssueStatus::Closed)
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::not_found("Issue"));
    }
}
