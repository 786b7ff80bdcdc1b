use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Enums ---

/// Position of a lead in the sales pipeline.
///
/// Manual moves permit any stage to any stage. There is no enforced
/// transition graph; the activity-driven rules in `leadflow-pipeline`
/// are the only automatic movements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    NewLead,
    Contacted,
    VoicemailLeft,
    LiveCall,
    SiteViewed,
    Appointment,
    FollowUp,
    NotInterested,
    SaleClosed,
}

impl Stage {
    /// Parse the wire/database string form. Returns `None` for unknown stages.
    pub fn parse(s: &str) -> Option<Stage> {
        match s {
            "new_lead" => Some(Stage::NewLead),
            "contacted" => Some(Stage::Contacted),
            "voicemail_left" => Some(Stage::VoicemailLeft),
            "live_call" => Some(Stage::LiveCall),
            "site_viewed" => Some(Stage::SiteViewed),
            "appointment" => Some(Stage::Appointment),
            "follow_up" => Some(Stage::FollowUp),
            "not_interested" => Some(Stage::NotInterested),
            "sale_closed" => Some(Stage::SaleClosed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::NewLead => "new_lead",
            Stage::Contacted => "contacted",
            Stage::VoicemailLeft => "voicemail_left",
            Stage::LiveCall => "live_call",
            Stage::SiteViewed => "site_viewed",
            Stage::Appointment => "appointment",
            Stage::FollowUp => "follow_up",
            Stage::NotInterested => "not_interested",
            Stage::SaleClosed => "sale_closed",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Categorical label attached to a lead. The set is closed: unknown tag
/// types are a validation error, while re-adding a known type is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagType {
    AnsweredCall,
    VoicemailLeft,
    ViewedDuringCall,
    ViewedAfterVoicemail,
    ReturnVisitor,
    CallbackReceived,
}

impl TagType {
    pub fn parse(s: &str) -> Option<TagType> {
        match s {
            "answered-call" => Some(TagType::AnsweredCall),
            "voicemail-left" => Some(TagType::VoicemailLeft),
            "viewed-during-call" => Some(TagType::ViewedDuringCall),
            "viewed-after-voicemail" => Some(TagType::ViewedAfterVoicemail),
            "return-visitor" => Some(TagType::ReturnVisitor),
            "callback-received" => Some(TagType::CallbackReceived),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TagType::AnsweredCall => "answered-call",
            TagType::VoicemailLeft => "voicemail-left",
            TagType::ViewedDuringCall => "viewed-during-call",
            TagType::ViewedAfterVoicemail => "viewed-after-voicemail",
            TagType::ReturnVisitor => "return-visitor",
            TagType::CallbackReceived => "callback-received",
        }
    }

    /// Tags the transition rules may attach without operator action.
    pub fn is_auto_tag(&self) -> bool {
        !matches!(self, TagType::CallbackReceived)
    }
}

impl std::fmt::Display for TagType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// --- Rows ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub company_id: Uuid,
    pub stage: Stage,
    pub updated_at: DateTime<Utc>,
}

/// One immutable fact in the activity log. Assigned id/created_at by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub session_id: Option<Uuid>,
    pub lead_id: Uuid,
    pub company_id: Uuid,
    pub user_name: String,
    pub action: String,
    pub action_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// An activity to be recorded. The caller builds this; the store assigns
/// id and created_at.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub session_id: Option<Uuid>,
    pub lead_id: Uuid,
    pub company_id: Uuid,
    pub user_name: String,
    pub action: String,
    pub action_data: serde_json::Value,
}

impl NewActivity {
    pub fn new(
        lead_id: Uuid,
        company_id: Uuid,
        user_name: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            session_id: None,
            lead_id,
            company_id,
            user_name: user_name.into(),
            action: action.into(),
            action_data: serde_json::Value::Object(Default::default()),
        }
    }

    pub fn with_session(mut self, session_id: Uuid) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.action_data = data;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub tag_type: TagType,
    pub tag_value: String,
    pub is_auto_generated: bool,
    pub created_by: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// One operator's bounded block of cold-call work. `end_time` is null while
/// the session is open; the counters are written once, at close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub leads_processed: i64,
    pub calls_made: i64,
    pub contacts_made: i64,
    pub voicemails_left: i64,
}

impl Session {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

// --- sqlx row decoding ---
//
// stage and tag_type are stored as text; unknown values surface as column
// decode errors rather than silently defaulting.

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for Lead {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> std::result::Result<Self, sqlx::Error> {
        use sqlx::Row;
        let stage_str: String = row.try_get("stage")?;
        let stage = Stage::parse(&stage_str).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "stage".into(),
            source: format!("unknown stage '{stage_str}'").into(),
        })?;
        Ok(Lead {
            id: row.try_get("id")?,
            company_id: row.try_get("company_id")?,
            stage,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for Activity {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> std::result::Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Activity {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            lead_id: row.try_get("lead_id")?,
            company_id: row.try_get("company_id")?,
            user_name: row.try_get("user_name")?,
            action: row.try_get("action")?,
            action_data: row.try_get("action_data")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for Tag {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> std::result::Result<Self, sqlx::Error> {
        use sqlx::Row;
        let type_str: String = row.try_get("tag_type")?;
        let tag_type = TagType::parse(&type_str).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "tag_type".into(),
            source: format!("unknown tag type '{type_str}'").into(),
        })?;
        Ok(Tag {
            id: row.try_get("id")?,
            lead_id: row.try_get("lead_id")?,
            tag_type,
            tag_value: row.try_get("tag_value")?,
            is_auto_generated: row.try_get("is_auto_generated")?,
            created_by: row.try_get("created_by")?,
            metadata: row.try_get("metadata")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for Session {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> std::result::Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Session {
            id: row.try_get("id")?,
            user_name: row.try_get("user_name")?,
            start_time: row.try_get("start_time")?,
            end_time: row.try_get("end_time")?,
            leads_processed: row.try_get("leads_processed")?,
            calls_made: row.try_get("calls_made")?,
            contacts_made: row.try_get("contacts_made")?,
            voicemails_left: row.try_get("voicemails_left")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_round_trips_through_strings() {
        for s in [
            Stage::NewLead,
            Stage::Contacted,
            Stage::VoicemailLeft,
            Stage::LiveCall,
            Stage::SiteViewed,
            Stage::Appointment,
            Stage::FollowUp,
            Stage::NotInterested,
            Stage::SaleClosed,
        ] {
            assert_eq!(Stage::parse(s.as_str()), Some(s));
        }
    }

    #[test]
    fn unknown_stage_rejected() {
        assert_eq!(Stage::parse("warm_lead"), None);
        assert_eq!(Stage::parse(""), None);
    }

    #[test]
    fn stage_serde_uses_snake_case() {
        let json = serde_json::to_string(&Stage::LiveCall).unwrap();
        assert_eq!(json, "\"live_call\"");
        let back: Stage = serde_json::from_str("\"site_viewed\"").unwrap();
        assert_eq!(back, Stage::SiteViewed);
    }

    #[test]
    fn tag_type_round_trips_through_strings() {
        for t in [
            TagType::AnsweredCall,
            TagType::VoicemailLeft,
            TagType::ViewedDuringCall,
            TagType::ViewedAfterVoicemail,
            TagType::ReturnVisitor,
            TagType::CallbackReceived,
        ] {
            assert_eq!(TagType::parse(t.as_str()), Some(t));
        }
    }

    #[test]
    fn unknown_tag_type_rejected() {
        assert_eq!(TagType::parse("hot-lead"), None);
        assert_eq!(TagType::parse("answered_call"), None);
    }

    #[test]
    fn callback_received_is_not_an_auto_tag() {
        assert!(!TagType::CallbackReceived.is_auto_tag());
        assert!(TagType::AnsweredCall.is_auto_tag());
    }
}
