//! Authentication state observer

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use syndic_core::repositories::AuthUser;

use crate::events::AppEvent;

/// Forwards auth session changes to the app loop. One per `App`; the
/// forwarding task stops when the observer is dropped.
pub struct SessionObserver {
    current: Option<AuthUser>,
    task: JoinHandle<()>,
}

impl SessionObserver {
    pub fn spawn(mut sessions: watch::Receiver<Option<AuthUser>>, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        let current = sessions.borrow_and_update().clone();

        let task = tokio::spawn(async move {
            while sessions.changed().await.is_ok() {
                let user = sessions.borrow_and_update().clone();
                debug!("Session changed: {:?}", user.as_ref().map(|u| &u.id));
                if event_tx.send(AppEvent::SessionChanged(user)).is_err() {
                    break;
                }
            }
        });

        Self { current, task }
    }

    pub fn current_user(&self) -> Option<&AuthUser> {
        self.current.as_ref()
    }

    /// Returns true when the identity actually changed.
    pub(crate) fn apply(&mut self, user: Option<AuthUser>) -> bool {
        let changed = self.current.as_ref().map(|u| &u.id) != user.as_ref().map(|u| &u.id);
        if changed {
            info!(
                "Session {}",
                if user.is_some() { "started" } else { "ended" }
            );
        }
        self.current = user;
        changed
    }
}

impl Drop for SessionObserver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> AuthUser {
        AuthUser {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            display_name: id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_forwards_changes_and_stops_on_drop() {
        let (session_tx, session_rx) = watch::channel(Some(user("u1")));
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();

        let observer = SessionObserver::spawn(session_rx, event_tx);
        assert_eq!(observer.current_user().map(|u| u.id.as_str()), Some("u1"));

        session_tx.send_replace(None);
        match event_rx.recv().await {
            Some(AppEvent::SessionChanged(None)) => {}
            other => panic!("unexpected event: {:?}", other),
        }

        drop(observer);
        tokio::task::yield_now().await;
        session_tx.send_replace(Some(user("u2")));
        let next = tokio::time::timeout(std::time::Duration::from_millis(200), event_rx.recv()).await;
        assert!(!matches!(next, Ok(Some(_))));
    }

    #[tokio::test]
    async fn test_apply_reports_identity_changes_only() {
        let (_session_tx, session_rx) = watch::channel(None);
        let (event_tx, _event_rx) = mpsc::unbounded_channel();
        let mut observer = SessionObserver::spawn(session_rx, event_tx);

        assert!(observer.apply(Some(user("u1"))));
        let mut renamed = user("u1");
        renamed.display_name = "New name".to_string();
        assert!(!observer.apply(Some(renamed)));
        assert!(observer.apply(None));
    }
}
