// ============================================================================
// Syndic Core - Meeting Entity
// File: crates/syndic-core/src/domain/meeting.rs
// Description: Building meetings; `type` is optional on older records
// ============================================================================

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::schedule::{combine, parse_date, parse_time};
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingType {
    General,
    Budget,
    Administrative,
    Urgent,
}

impl MeetingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingType::General => "general",
            MeetingType::Budget => "budget",
            MeetingType::Administrative => "administrative",
            MeetingType::Urgent => "urgent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "general" => Some(MeetingType::General),
            "budget" => Some(MeetingType::Budget),
            "administrative" => Some(MeetingType::Administrative),
            "urgent" => Some(MeetingType::Urgent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: String,
    pub apartment_id: String,
    pub reason: String,
    pub place: String,
    pub date: String,
    pub time: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub meeting_type: Option<MeetingType>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

impl Meeting {
    pub fn scheduled_at(&self) -> Option<NaiveDateTime> {
        combine(&self.date, &self.time)
    }

    pub fn is_upcoming(&self, now: NaiveDateTime) -> bool {
        self.scheduled_at().map(|at| at >= now).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Validate)]
pub struct NewMeeting {
    #[validate(length(min = 3, max = 200, message = "Reason must be between 3 and 200 characters"))]
    pub reason: String,

    #[validate(length(min = 2, max = 120, message = "Place must be between 2 and 120 characters"))]
    pub place: String,

    pub date: String,
    pub time: String,
    pub meeting_type: Option<MeetingType>,
}

impl NewMeeting {
    pub fn check(&self) -> Result<(), DomainError> {
        self.validate()?;
        parse_date(&self.date)?;
        parse_time(&self.time)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct MeetingUpdate {
    #[validate(length(min = 3, max = 200, message = "Reason must be between 3 and 200 characters"))]
    pub reason: Option<String>,

    #[validate(length(min = 2, max = 120, message = "Place must be between 2 and 120 characters"))]
    pub place: Option<String>,

    pub date: Option<String>,
    pub time: Option<String>,
    pub meeting_type: Option<MeetingType>,
}

impl MeetingUpdate {
    pub fn check(&self) -> Result<(), DomainError> {
        self.validate()?;
        if let Some(date) = &self.date {
            parse_date(date)?;
        }
        if let Some(time) = &self.time {
            parse_time(time)?;
        }
        Ok(())
    }

    pub fn apply(&self, meeting: &mut Meeting) {
        if let Some(reason) = &self.reason {
            meeting.reason = reason.trim().to_string();
        }
        if let Some(place) = &self.place {
            meeting.place = place.trim().to_string();
        }
        if let Some(date) = &self.date {
            meeting.date = date.trim().to_string();
        }
        if let Some(time) = &self.time {
            meeting.time = time.trim().to_string();
        }
        if self.meeting_type.is_some() {
            meeting.meeting_type = self.meeting_type;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meeting_without_type_decodes() {
        let json = serde_json::json!({
            "id": "m1",
            "apartmentId": "apt-1",
            "reason": "Annual budget",
            "place": "Lobby",
            "date": "10/06/2024",
            "time": "18:00",
            "createdAt": "2024-05-01T10:00:00Z",
            "createdBy": "u1"
        });
        let meeting: Meeting = serde_json::from_value(json).unwrap();
        assert!(meeting.meeting_type.is_none());
        assert!(meeting.scheduled_at().is_some());

        let back = serde_json::to_value(&meeting).unwrap();
        assert!(back.get("type").is_none());
    }

    #[test]
    fn test_new_meeting_rejects_bad_time() {
        let form = NewMeeting {
            reason: "Elevator repair vote".into(),
            place: "Lobby".into(),
            date: "10/06/2024".into(),
            time: "6pm".into(),
            meeting_type: Some(MeetingType::Urgent),
        };
        assert!(matches!(form.check(), Err(DomainError::ValidationError(_))));
    }
}
