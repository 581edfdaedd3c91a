//! Onboarding/role status resolver
//!
//! Tri-state (idle, loading, known) view of the signed-in user's onboarding.
//! Lookups run in spawned tasks and report back through `AppEvent::StatusResolved`;
//! results carrying an old generation are dropped.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use syndic_core::domain::OnboardingStatus;
use syndic_core::services::ProfileService;

use crate::context::Store;
use crate::events::AppEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Idle,
    Loading { user_id: String },
    Known { user_id: String, status: OnboardingStatus },
}

pub struct StatusResolver {
    profiles: Arc<ProfileService<Store>>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    generation: u64,
    state: Resolution,
}

impl StatusResolver {
    pub fn new(profiles: Arc<ProfileService<Store>>, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            profiles,
            event_tx,
            generation: 0,
            state: Resolution::Idle,
        }
    }

    pub fn state(&self) -> &Resolution {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, Resolution::Loading { .. })
    }

    pub fn status(&self) -> Option<&OnboardingStatus> {
        match &self.state {
            Resolution::Known { status, .. } => Some(status),
            _ => None,
        }
    }

    /// Start a lookup for `user_id`. Returns false when one is already
    /// outstanding for the same user, in which case nothing new is sent.
    pub fn resolve(&mut self, user_id: &str) -> bool {
        if let Resolution::Loading { user_id: pending } = &self.state {
            if pending == user_id {
                debug!("Status lookup for {} already in flight", user_id);
                return false;
            }
        }

        self.generation += 1;
        let generation = self.generation;
        self.state = Resolution::Loading {
            user_id: user_id.to_string(),
        };

        let profiles = Arc::clone(&self.profiles);
        let tx = self.event_tx.clone();
        let user_id = user_id.to_string();
        tokio::spawn(async move {
            let status = match profiles.resolve_status(&user_id).await {
                Ok(status) => status,
                Err(e) => {
                    error!("Status resolution failed for {}: {}", user_id, e);
                    OnboardingStatus::incomplete()
                }
            };
            let _ = tx.send(AppEvent::StatusResolved {
                generation,
                user_id,
                status,
            });
        });
        true
    }

    /// Manual re-check after an onboarding write.
    pub fn refresh(&mut self, user_id: &str) -> bool {
        self.resolve(user_id)
    }

    /// Forget everything; pending lookups become stale.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.state = Resolution::Idle;
    }

    /// Accept a finished lookup if it is still the current one.
    pub fn accept(&mut self, generation: u64, user_id: &str, status: OnboardingStatus) -> Option<OnboardingStatus> {
        let current = matches!(&self.state, Resolution::Loading { user_id: pending } if pending == user_id);
        if generation != self.generation || !current {
            debug!("Discarding stale status for {} (generation {})", user_id, generation);
            return None;
        }

        info!("Onboarding status for {}: completed={}", user_id, status.completed);
        self.state = Resolution::Known {
            user_id: user_id.to_string(),
            status: status.clone(),
        };
        Some(status)
    }
}
