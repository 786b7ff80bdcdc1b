//! Recognized activity action kinds.
//!
//! The action column is an open string: new kinds are added without schema
//! changes, and unrecognized kinds are stored as-is. These constants are the
//! set the transition rules and session counters care about.

pub const PREVIEW_WEBSITE: &str = "preview_website";
pub const VIEW_GOOGLE_REVIEWS: &str = "view_google_reviews";
pub const CALL_STARTED: &str = "call_started";
pub const SMS_ANSWER_CALL_SENT: &str = "sms_answer_call_sent";
pub const SMS_VOICEMAIL_1_SENT: &str = "sms_voicemail_1_sent";
pub const SMS_VOICEMAIL_2_SENT: &str = "sms_voicemail_2_sent";
pub const OWNER_NAME_ADDED: &str = "owner_name_added";
pub const OWNER_EMAIL_ADDED: &str = "owner_email_added";
pub const NOTE_ADDED: &str = "note_added";
pub const TEMPLATE_SAVED: &str = "template_saved";
pub const UNSUCCESSFUL_CALL_MARKED: &str = "unsuccessful_call_marked";
pub const WEBSITE_VISITED: &str = "website_visited";
pub const APPOINTMENT_SET: &str = "appointment_set";
