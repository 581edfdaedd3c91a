// ============================================================================
// Syndic Core - Meeting Service
// File: crates/syndic-core/src/services/meeting_service.rs
// ============================================================================

use chrono::{NaiveDateTime, Utc};
use std::sync::Arc;
use syndic_shared::constants::{COLLECTION_MEETINGS, DEFAULT_MAX_WRITE_ATTEMPTS};
use syndic_shared::new_id;
use tracing::info;

use super::gateway::ArrayDocument;
use crate::domain::{Actor, Meeting, MeetingUpdate, NewMeeting};
use crate::error::DomainError;
use crate::repositories::DocumentStore;

const FIELD: &str = "meetings";

pub struct MeetingService<S: DocumentStore + ?Sized> {
    store: Arc<S>,
    max_write_attempts: u32,
}

impl<S: DocumentStore + ?Sized> MeetingService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
        }
    }

    pub fn with_max_write_attempts(mut self, attempts: u32) -> Self {
        self.max_write_attempts = attempts;
        self
    }

    fn document(&self) -> ArrayDocument<'_, S> {
        ArrayDocument::new(self.store.as_ref(), COLLECTION_MEETINGS, FIELD, self.max_write_attempts)
    }

    pub async fn add_meeting(&self, actor: &Actor, apartment_id: &str, form: NewMeeting) -> Result<Meeting, DomainError> {
        actor.ensure_manager(apartment_id)?;
        form.check()?;

        let meeting = Meeting {
            id: new_id(),
            apartment_id: apartment_id.to_string(),
            reason: form.reason.trim().to_string(),
            place: form.place.trim().to_string(),
            date: form.date.trim().to_string(),
            time: form.time.trim().to_string(),
            meeting_type: form.meeting_type,
            created_at: Utc::now(),
            created_by: actor.user_id.clone(),
        };

        let entry = meeting.clone();
        self.document()
            .mutate(apartment_id, move |items: &mut Vec<Meeting>| {
                items.push(entry.clone());
                Ok(())
            })
            .await?;

        info!("Meeting {} scheduled for {} {} in {}", meeting.id, meeting.date, meeting.time, apartment_id);
        Ok(meeting)
    }

    pub async fn get_apartment_meetings(&self, actor: &Actor, apartment_id: &str) -> Result<Vec<Meeting>, DomainError> {
        actor.ensure_member(apartment_id)?;
        self.document().load(apartment_id).await
    }

    pub async fn update_meeting(
        &self,
        actor: &Actor,
        apartment_id: &str,
        meeting_id: &str,
        update: MeetingUpdate,
    ) -> Result<Meeting, DomainError> {
        actor.ensure_manager(apartment_id)?;
        update.check()?;

        let meeting = self
            .document()
            .mutate(apartment_id, |items: &mut Vec<Meeting>| {
                let meeting = items
                    .iter_mut()
                    .find(|m| m.id == meeting_id)
                    .ok_or_else(|| DomainError::not_found("Meeting"))?;
                update.apply(meeting);
                Ok(meeting.clone())
            })
            .await?;

        info!("Meeting {} updated in {}", meeting_id, apartment_id);
        Ok(meeting)
    }

    pub async fn delete_meeting(&self, actor: &Actor, apartment_id: &str, meeting_id: &str) -> Result<(), DomainError> {
        actor.ensure_manager(apartment_id)?;

        self.document()
            .mutate(apartment_id, |items: &mut Vec<Meeting>| {
                let position = items
                    .iter()
                    .position(|m| m.id == meeting_id)
                    .ok_or_else(|| DomainError::not_found("Meeting"))?;
                items.remove(position);
                Ok(())
            })
            .await?;

        info!("Meeting {} deleted from {}", meeting_id, apartment_id);
        Ok(())
    }

    /// Meetings at or after `now`, soonest first. Unparseable schedules are skipped.
    pub async fn upcoming_meetings(
        &self,
        actor: &Actor,
        apartment_id: &str,
        now: NaiveDateTime,
    ) -> Result<Vec<Meeting>, DomainError> {
        let mut meetings: Vec<Meeting> = self
            .get_apartment_meetings(actor, apartment_id)
            .await?
            .into_iter()
            .filter(|m| m.is_upcoming(now))
            .collect();
        meetings.sort_by_key(|m| m.scheduled_at());
        Ok(meetings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schedule::combine;
    use crate::services::testing::{syndic, FakeStore};

    fn meeting(date: &str, time: &str) -> NewMeeting {
        NewMeeting {
            reason: "Roof repairs".to_string(),
            place: "Lobby".to_string(),
            date: date.to_string(),
            time: time.to_string(),
            meeting_type: None,
        }
    }

    #[tokio::test]
    async fn test_second_delete_is_not_found() {
        let service = MeetingService::new(FakeStore::shared());
        let actor = syndic("apt-1");
        let created = service.add_meeting(&actor, "apt-1", meeting("10/06/2024", "18:30")).await.unwrap();

        service.delete_meeting(&actor, "apt-1", &created.id).await.unwrap();
        let err = service.delete_meeting(&actor, "apt-1", &created.id).await.unwrap_err();

        assert_eq!(err, DomainError::not_found("Meeting"));
        assert_eq!(err.to_string(), "Meeting not found");
    }

    #[tokio::test]
    async fn test_rejects_bad_time() {
        let service = MeetingService::new(FakeStore::shared());
        let err = service
            .add_meeting(&syndic("apt-1"), "apt-1", meeting("10/06/2024", "25:99"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_update_and_upcoming_order() {
        let service = MeetingService::new(FakeStore::shared());
        let actor = syndic("apt-1");
        let late = service.add_meeting(&actor, "apt-1", meeting("20/06/2024", "09:00")).await.unwrap();
        service.add_meeting(&actor, "apt-1", meeting("01/01/2024", "09:00")).await.unwrap();
        let soon = service.add_meeting(&actor, "apt-1", meeting("12/06/2024", "09:00")).await.unwrap();

        let update = MeetingUpdate {
            place: Some("Rooftop".to_string()),
            ..Default::default()
        };
        let updated = service.update_meeting(&actor, "apt-1", &late.id, update).await.unwrap();
        assert_eq!(updated.place, "Rooftop");
        assert_eq!(updated.reason, late.reason);

        let now = combine("10/06/2024", "12:00").unwrap();
        let upcoming = service.upcoming_meetings(&actor, "apt-1", now).await.unwrap();
        let ids: Vec<_> = upcoming.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec![soon.id.as_str(), late.id.as_str()]);
    }
}
