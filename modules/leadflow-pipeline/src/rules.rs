//! Pure stage-transition and auto-tag rules. No I/O.

use serde_json::json;

use leadflow_common::{actions, Stage, TagType};

/// A tag the rules want attached as a side effect of an activity.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoTag {
    pub tag_type: TagType,
    pub metadata: serde_json::Value,
}

impl AutoTag {
    fn plain(tag_type: TagType) -> Self {
        Self {
            tag_type,
            metadata: json!({}),
        }
    }
}

/// The stage an activity moves a lead to, if any.
///
/// A call-answered signal always lands in `live_call`, whatever the current
/// stage. A tracked site visit only advances to `site_viewed` while a call
/// is live. There is no enforced transition graph beyond these rules.
pub fn next_stage(current: Stage, action: &str) -> Option<Stage> {
    match action {
        actions::SMS_ANSWER_CALL_SENT => Some(Stage::LiveCall),
        actions::WEBSITE_VISITED if current == Stage::LiveCall => Some(Stage::SiteViewed),
        actions::APPOINTMENT_SET => Some(Stage::Appointment),
        _ => None,
    }
}

/// System tags an activity attaches. `prior_site_visits` is the count of
/// site visits already recorded for the lead, before this activity.
pub fn auto_tags(current: Stage, action: &str, prior_site_visits: i64) -> Vec<AutoTag> {
    let mut tags = Vec::new();

    match action {
        actions::SMS_ANSWER_CALL_SENT => {
            tags.push(AutoTag::plain(TagType::AnsweredCall));
        }
        actions::SMS_VOICEMAIL_1_SENT | actions::SMS_VOICEMAIL_2_SENT => {
            tags.push(AutoTag::plain(TagType::VoicemailLeft));
        }
        actions::WEBSITE_VISITED => {
            if current == Stage::LiveCall {
                tags.push(AutoTag {
                    tag_type: TagType::ViewedDuringCall,
                    metadata: json!({
                        "triggeredBy": "website_visit",
                        "previousStage": current.as_str(),
                    }),
                });
            }
            if current == Stage::VoicemailLeft {
                tags.push(AutoTag {
                    tag_type: TagType::ViewedAfterVoicemail,
                    metadata: json!({
                        "triggeredBy": "website_visit",
                        "previousStage": current.as_str(),
                    }),
                });
            }
            if prior_site_visits >= 1 {
                tags.push(AutoTag::plain(TagType::ReturnVisitor));
            }
        }
        _ => {}
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answered_call_moves_to_live_call_from_anywhere() {
        for current in [
            Stage::NewLead,
            Stage::Contacted,
            Stage::VoicemailLeft,
            Stage::SiteViewed,
            Stage::FollowUp,
        ] {
            assert_eq!(
                next_stage(current, actions::SMS_ANSWER_CALL_SENT),
                Some(Stage::LiveCall)
            );
        }
    }

    #[test]
    fn site_visit_advances_only_during_live_call() {
        assert_eq!(
            next_stage(Stage::LiveCall, actions::WEBSITE_VISITED),
            Some(Stage::SiteViewed)
        );
        assert_eq!(next_stage(Stage::NewLead, actions::WEBSITE_VISITED), None);
        assert_eq!(
            next_stage(Stage::VoicemailLeft, actions::WEBSITE_VISITED),
            None
        );
        assert_eq!(next_stage(Stage::SiteViewed, actions::WEBSITE_VISITED), None);
    }

    #[test]
    fn appointment_set_moves_to_appointment() {
        assert_eq!(
            next_stage(Stage::SiteViewed, actions::APPOINTMENT_SET),
            Some(Stage::Appointment)
        );
        assert_eq!(
            next_stage(Stage::NewLead, actions::APPOINTMENT_SET),
            Some(Stage::Appointment)
        );
    }

    #[test]
    fn unrecognized_actions_do_not_move_stage() {
        assert_eq!(next_stage(Stage::NewLead, actions::PREVIEW_WEBSITE), None);
        assert_eq!(next_stage(Stage::LiveCall, actions::NOTE_ADDED), None);
        assert_eq!(next_stage(Stage::LiveCall, "some_future_action"), None);
    }

    #[test]
    fn answered_call_tags_answered_call() {
        let tags = auto_tags(Stage::NewLead, actions::SMS_ANSWER_CALL_SENT, 0);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].tag_type, TagType::AnsweredCall);
    }

    #[test]
    fn voicemail_sms_tags_voicemail_left() {
        for action in [actions::SMS_VOICEMAIL_1_SENT, actions::SMS_VOICEMAIL_2_SENT] {
            let tags = auto_tags(Stage::NewLead, action, 0);
            assert_eq!(tags.len(), 1);
            assert_eq!(tags[0].tag_type, TagType::VoicemailLeft);
        }
    }

    #[test]
    fn voicemail_sms_does_not_move_stage() {
        assert_eq!(next_stage(Stage::NewLead, actions::SMS_VOICEMAIL_1_SENT), None);
        assert_eq!(next_stage(Stage::Contacted, actions::SMS_VOICEMAIL_2_SENT), None);
    }

    #[test]
    fn visit_during_call_tags_with_previous_stage() {
        let tags = auto_tags(Stage::LiveCall, actions::WEBSITE_VISITED, 0);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].tag_type, TagType::ViewedDuringCall);
        assert_eq!(tags[0].metadata["previousStage"], "live_call");
    }

    #[test]
    fn visit_after_voicemail_tags_viewed_after_voicemail() {
        let tags = auto_tags(Stage::VoicemailLeft, actions::WEBSITE_VISITED, 0);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].tag_type, TagType::ViewedAfterVoicemail);
        assert_eq!(tags[0].metadata["previousStage"], "voicemail_left");
    }

    #[test]
    fn repeat_visit_adds_return_visitor() {
        let tags = auto_tags(Stage::SiteViewed, actions::WEBSITE_VISITED, 1);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].tag_type, TagType::ReturnVisitor);
    }

    #[test]
    fn repeat_visit_during_call_gets_both_tags() {
        let tags = auto_tags(Stage::LiveCall, actions::WEBSITE_VISITED, 2);
        let types: Vec<TagType> = tags.iter().map(|t| t.tag_type).collect();
        assert_eq!(types, vec![TagType::ViewedDuringCall, TagType::ReturnVisitor]);
    }

    #[test]
    fn first_visit_outside_call_tags_nothing() {
        assert!(auto_tags(Stage::NewLead, actions::WEBSITE_VISITED, 0).is_empty());
    }
}
