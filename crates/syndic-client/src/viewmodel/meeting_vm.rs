//! Meetings screen

use tokio::sync::mpsc;

use syndic_core::domain::schedule::format_date;
use syndic_core::domain::{Actor, Meeting, MeetingType, MeetingUpdate, NewMeeting};

use super::spawn_scoped;
use crate::context::AppContext;
use crate::events::{AppEvent, Outcome};
use crate::i18n::{Translator, UserMessage};

pub struct MeetingViewModel {
    pub meetings: Vec<Meeting>,

    pub reason: String,
    pub place: String,
    pub date: String,
    pub time: String,
    pub meeting_type: Option<MeetingType>,
    pub editing: Option<String>,

    pub error: Option<String>,
    pub is_loading: bool,
    ctx: AppContext,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl MeetingViewModel {
    pub fn new(ctx: AppContext, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            meetings: Vec::new(),
            reason: String::new(),
            place: String::new(),
            date: format_date(chrono::Local::now().date_naive()),
            time: String::new(),
            meeting_type: None,
            editing: None,
            error: None,
            is_loading: false,
            ctx,
            event_tx,
        }
    }

    /// Meetings that have not started yet, soonest first
    pub fn upcoming(&self, now: chrono::NaiveDateTime) -> Vec<&Meeting> {
        let mut upcoming: Vec<&Meeting> = self.meetings.iter().filter(|m| m.is_upcoming(now)).collect();
        upcoming.sort_by_key(|m| m.scheduled_at());
        upcoming
    }

    pub fn refresh(&mut self, actor: &Actor) {
        let Some(apartment_id) = actor.apartment_id.clone() else {
            return;
        };
        self.is_loading = true;
        let meetings = self.ctx.meetings.clone();
        let actor = actor.clone();
        spawn_scoped(
            &self.ctx,
            &self.event_tx,
            async move { meetings.get_apartment_meetings(&actor, &apartment_id).await },
            AppEvent::MeetingsLoaded,
        );
    }

    pub fn on_loaded(&mut self, result: &Outcome<Vec<Meeting>>, translator: &Translator) {
        self.is_loading = false;
        match result {
            Ok(meetings) => {
                self.error = None;
                self.meetings = meetings.clone();
            }
            Err(e) => self.error = Some(e.user_message(translator)),
        }
    }

    pub fn start_edit(&mut self, meeting: &Meeting) {
        self.editing = Some(meeting.id.clone());
        self.reason = meeting.reason.clone();
        self.place = meeting.place.clone();
        self.date = meeting.date.clone();
        self.time = meeting.time.clone();
        self.meeting_type = meeting.meeting_type;
        self.error = None;
    }

    pub fn submit(&mut self, actor: &Actor) {
        let Some(apartment_id) = actor.apartment_id.clone() else {
            return;
        };
        if self.is_loading {
            return;
        }
        self.error = None;
        self.is_loading = true;

        let meetings = self.ctx.meetings.clone();
        let actor = actor.clone();
        match self.editing.clone() {
            Some(meeting_id) => {
                let update = MeetingUpdate {
                    reason: Some(self.reason.trim().to_string()),
                    place: Some(self.place.trim().to_string()),
                    date: Some(self.date.trim().to_string()),
                    time: Some(self.time.trim().to_string()),
                    meeting_type: self.meeting_type,
                };
                spawn_scoped(
                    &self.ctx,
                    &self.event_tx,
                    async move { meetings.update_meeting(&actor, &apartment_id, &meeting_id, update).await },
                    AppEvent::MeetingSaved,
                );
            }
            None => {
                let form = NewMeeting {
                    reason: self.reason.trim().to_string(),
                    place: self.place.trim().to_string(),
                    date: self.date.trim().to_string(),
                    time: self.time.trim().to_string(),
                    meeting_type: self.meeting_type,
                };
                spawn_scoped(
                    &self.ctx,
                    &self.event_tx,
                    async move { meetings.add_meeting(&actor, &apartment_id, form).await },
                    AppEvent::MeetingSaved,
                );
            }
        }
    }

    pub fn on_saved(&mut self, result: &Outcome<Meeting>, translator: &Translator) {
        self.is_loading = false;
        match result {
            Ok(meeting) => {
                match self.meetings.iter_mut().find(|m| m.id == meeting.id) {
                    Some(existing) => *existing = meeting.clone(),
                    None => self.meetings.push(meeting.clone()),
                }
                self.clear_form();
            }
            Err(e) => self.error = Some(e.user_message(translator)),
        }
    }

    pub fn delete(&mut self, actor: &Actor, meeting_id: &str) {
        let Some(apartment_id) = actor.apartment_id.clone() else {
            return;
        };
        self.is_loading = true;
        let meetings = self.ctx.meetings.clone();
        let actor = actor.clone();
        let meeting_id = meeting_id.to_string();
        spawn_scoped(
            &self.ctx,
            &self.event_tx,
            async move {
                meetings.delete_meeting(&actor, &apartment_id, &meeting_id).await?;
                Ok(meeting_id)
            },
            AppEvent::MeetingDeleted,
        );
    }

    pub fn on_deleted(&mut self, result: &Outcome<String>, translator: &Translator) {
        self.is_loading = false;
        match result {
            Ok(meeting_id) => {
                self.error = None;
                self.meetings.retain(|m| &m.id != meeting_id);
            }
            Err(e) => self.error = Some(e.user_message(translator)),
        }
    }

    pub fn clear_form(&mut self) {
        self.editing = None;
        self.reason.clear();
        self.place.clear();
        self.time.clear();
        self.meeting_type = None;
        self.error = None;
    }
}
