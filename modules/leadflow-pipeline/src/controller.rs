//! Applies the pure rules against storage.

use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use leadflow_common::{actions, Activity, LeadflowError, NewActivity, Stage, TagType};
use leadflow_store::{ActivityLog, CompanyStore, LeadStore, TagAdd, TagStore};

use crate::rules;

/// What a tracked activity did: the stored row, the stage the lead ended up
/// in, and any tags the rules attached.
#[derive(Debug, Clone)]
pub struct TrackOutcome {
    pub activity: Activity,
    pub stage: Stage,
    pub auto_tags: Vec<TagType>,
}

#[derive(Clone)]
pub struct PipelineController {
    leads: LeadStore,
    tags: TagStore,
    activity: ActivityLog,
    companies: CompanyStore,
}

impl PipelineController {
    pub fn new(
        leads: LeadStore,
        tags: TagStore,
        activity: ActivityLog,
        companies: CompanyStore,
    ) -> Self {
        Self {
            leads,
            tags,
            activity,
            companies,
        }
    }

    /// Record an activity and apply the automatic stage/tag rules.
    ///
    /// The activity row, the stage update, and each tag add are independent
    /// statements. If a later write fails the earlier ones stand; the error
    /// is returned to the caller.
    pub async fn track(&self, new: NewActivity) -> Result<TrackOutcome, LeadflowError> {
        let lead = self
            .leads
            .get(new.lead_id)
            .await?
            .ok_or_else(|| LeadflowError::NotFound(format!("lead {}", new.lead_id)))?;

        if !self.companies.exists(new.company_id).await? {
            return Err(LeadflowError::NotFound(format!(
                "company {}",
                new.company_id
            )));
        }

        // Counted before the insert so the first visit is not its own "prior".
        let prior_site_visits = if new.action == actions::WEBSITE_VISITED {
            self.activity.site_visit_count(new.lead_id).await?
        } else {
            0
        };

        let action = new.action.clone();
        let activity = self.activity.record(new).await?;

        let new_stage = rules::next_stage(lead.stage, &action);
        let auto = rules::auto_tags(lead.stage, &action, prior_site_visits);

        if let Some(stage) = new_stage {
            self.leads.set_stage(lead.id, stage).await?;
            info!(lead_id = %lead.id, from = %lead.stage, to = %stage, action = %action, "auto stage move");
        }

        let mut applied = Vec::with_capacity(auto.len());
        for tag in auto {
            match self
                .tags
                .add(lead.id, tag.tag_type, "system", true, tag.metadata)
                .await
            {
                Ok(TagAdd::Added(_)) => applied.push(tag.tag_type),
                Ok(TagAdd::Duplicate) => {}
                Err(e) => {
                    // Stage may already be written; surfaced, not rolled back.
                    warn!(lead_id = %lead.id, tag = %tag.tag_type, error = %e, "auto tag failed");
                    return Err(e.into());
                }
            }
        }

        Ok(TrackOutcome {
            activity,
            stage: new_stage.unwrap_or(lead.stage),
            auto_tags: applied,
        })
    }

    /// Manual stage override. Any stage can move to any other.
    pub async fn move_stage(
        &self,
        lead_id: Uuid,
        new_stage: Stage,
        user_name: &str,
    ) -> Result<(), LeadflowError> {
        let lead = self
            .leads
            .get(lead_id)
            .await?
            .ok_or_else(|| LeadflowError::NotFound(format!("lead {lead_id}")))?;

        self.leads.set_stage(lead_id, new_stage).await?;

        self.activity
            .record(
                NewActivity::new(lead_id, lead.company_id, user_name, "stage_move").with_data(
                    json!({
                        "from": lead.stage.as_str(),
                        "to": new_stage.as_str(),
                    }),
                ),
            )
            .await?;

        Ok(())
    }

    /// Attach a free-text note to a lead, as a `note_added` activity.
    pub async fn add_note(
        &self,
        lead_id: Uuid,
        note: &str,
        user_name: &str,
    ) -> Result<Activity, LeadflowError> {
        let lead = self
            .leads
            .get(lead_id)
            .await?
            .ok_or_else(|| LeadflowError::NotFound(format!("lead {lead_id}")))?;

        let activity = self
            .activity
            .record(
                NewActivity::new(lead_id, lead.company_id, user_name, actions::NOTE_ADDED)
                    .with_data(json!({ "note": note })),
            )
            .await?;

        Ok(activity)
    }

    /// Direct user-driven tag add. Duplicate adds are a success no-op.
    pub async fn add_tag(
        &self,
        lead_id: Uuid,
        tag_type: TagType,
        created_by: &str,
    ) -> Result<TagAdd, LeadflowError> {
        if !self.leads.exists(lead_id).await? {
            return Err(LeadflowError::NotFound(format!("lead {lead_id}")));
        }

        let outcome = self
            .tags
            .add(lead_id, tag_type, created_by, false, json!({}))
            .await?;

        Ok(outcome)
    }
}
