//! Issue reporting and tracking

use tokio::sync::mpsc;

use syndic_core::domain::{Actor, Issue, IssueStatus, IssueType, NewIssue};
use syndic_core::repositories::ImageUpload;

use super::spawn_scoped;
use crate::context::AppContext;
use crate::events::{AppEvent, Outcome};
use crate::i18n::{Translator, UserMessage};

pub struct IssueViewModel {
    pub issues: Vec<Issue>,

    pub issue_type: IssueType,
    pub description: String,
    /// Photos picked for the next report
    pub images: Vec<ImageUpload>,

    pub error: Option<String>,
    pub is_loading: bool,
    ctx: AppContext,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl IssueViewModel {
    pub fn new(ctx: AppContext, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            issues: Vec::new(),
            issue_type: IssueType::Other,
            description: String::new(),
            images: Vec::new(),
            error: None,
            is_loading: false,
            ctx,
            event_tx,
        }
    }

    pub fn attach(&mut self, image: ImageUpload) {
        self.images.push(image);
    }

    pub fn remove_image(&mut self, index: usize) {
        if index < self.images.len() {
            self.images.remove(index);
        }
    }

    pub fn refresh(&mut self, actor: &Actor) {
        let Some(apartment_id) = actor.apartment_id.clone() else {
            return;
        };
        self.is_loading = true;
        let issues = self.ctx.issues.clone();
        let actor = actor.clone();
        spawn_scoped(
            &self.ctx,
            &self.event_tx,
            async move { issues.get_apartment_issues(&actor, &apartment_id).await },
            AppEvent::IssuesLoaded,
        );
    }

    pub fn on_loaded(&mut self, result: &Outcome<Vec<Issue>>, translator: &Translator) {
        self.is_loading = false;
        match result {
            Ok(issues) => {
                self.error = None;
                self.issues = issues.clone();
            }
            Err(e) => self.error = Some(e.user_message(translator)),
        }
    }

    /// Report with every attached photo. The form keeps its content until the report succeeds.
    pub fn submit(&mut self, actor: &Actor) {
        let Some(apartment_id) = actor.apartment_id.clone() else {
            return;
        };
        if self.is_loading {
            return;
        }
        self.error = None;
        self.is_loading = true;

        let issues = self.ctx.issues.clone();
        let actor = actor.clone();
        let form = NewIssue {
            issue_type: self.issue_type,
            description: self.description.clone(),
        };
        let images = self.images.clone();
        spawn_scoped(
            &self.ctx,
            &self.event_tx,
            async move { issues.report_issue(&actor, &apartment_id, form, images).await },
            AppEvent::IssueSaved,
        );
    }

    pub fn change_status(&mut self, actor: &Actor, issue_id: &str, status: IssueStatus) {
        let Some(apartment_id) = actor.apartment_id.clone() else {
            return;
        };
        self.is_loading = true;
        let issues = self.ctx.issues.clone();
        let actor = actor.clone();
        let issue_id = issue_id.to_string();
        spawn_scoped(
            &self.ctx,
            &self.event_tx,
            async move { issues.change_issue_status(&actor, &apartment_id, &issue_id, status).await },
            AppEvent::IssueSaved,
        );
    }

    pub fn on_saved(&mut self, result: &Outcome<Issue>, translator: &Translator) {
        self.is_loading = false;
        match result {
            Ok(issue) => {
                self.error = None;
                match self.issues.iter_mut().find(|i| i.id == issue.id) {
                    Some(existing) => *existing = issue.clone(),
                    None => {
                        self.issues.insert(0, issue.clone());
                        self.description.clear();
                        self.images.clear();
                    }
                }
            }
            Err(e) => self.error = Some(e.user_message(translator)),
        }
    }
}
