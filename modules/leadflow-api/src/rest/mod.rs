use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use leadflow_common::{LeadflowError, NewActivity, Stage, TagType};
use leadflow_store::TagAdd;

use crate::AppState;

// --- Request bodies ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    lead_id: Option<Uuid>,
    company_id: Option<Uuid>,
    session_id: Option<Uuid>,
    user_name: Option<String>,
    action: Option<String>,
    action_data: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTagRequest {
    lead_id: Option<Uuid>,
    tag_type: Option<String>,
    created_by: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    user_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSessionQuery {
    user_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveLeadRequest {
    lead_id: Option<Uuid>,
    new_stage: Option<String>,
    user_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRequest {
    lead_id: Option<Uuid>,
    note: Option<String>,
    user_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadRequest {
    company_id: Option<Uuid>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLeadsQuery {
    company_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct CreateCompanyRequest {
    name: Option<String>,
    slug: Option<String>,
}

// --- Helpers ---

fn bad_request(message: &str) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"error": message})),
    )
        .into_response()
}

/// Map a domain error to a response. Each handler is the error boundary:
/// nothing propagates past here.
fn domain_error(e: LeadflowError, context: &str) -> axum::response::Response {
    match e {
        LeadflowError::Validation(msg) => bad_request(&msg),
        LeadflowError::NotFound(what) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": format!("{what} not found")})),
        )
            .into_response(),
        other => {
            warn!(error = %other, context, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Validate a track request into a NewActivity. Missing leadId/action is the
/// 400 case the callers rely on; everything else rides along.
pub fn validate_track(req: TrackRequest) -> Result<NewActivity, String> {
    let (Some(lead_id), Some(action)) = (req.lead_id, req.action.filter(|a| !a.is_empty()))
    else {
        return Err("leadId and action are required".to_string());
    };
    let Some(company_id) = req.company_id else {
        return Err("companyId is required".to_string());
    };
    let Some(user_name) = req.user_name.filter(|u| !u.is_empty()) else {
        return Err("userName is required".to_string());
    };

    let mut activity = NewActivity::new(lead_id, company_id, user_name, action);
    if let Some(session_id) = req.session_id {
        activity = activity.with_session(session_id);
    }
    if let Some(data) = req.action_data {
        activity = activity.with_data(data);
    }
    Ok(activity)
}

// --- Activity recorder ---

pub async fn api_track_activity(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TrackRequest>,
) -> impl IntoResponse {
    let activity = match validate_track(body) {
        Ok(a) => a,
        Err(msg) => return bad_request(&msg),
    };

    match state.controller.track(activity).await {
        Ok(outcome) => Json(serde_json::json!({
            "activityId": outcome.activity.id,
            "stage": outcome.stage,
            "autoTags": outcome.auto_tags,
        }))
        .into_response(),
        Err(e) => domain_error(e, "track activity"),
    }
}

pub async fn api_lead_activities(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.activity.for_lead(lead_id).await {
        Ok(activities) => Json(activities).into_response(),
        Err(e) => {
            warn!(error = %e, %lead_id, "failed to load lead activities");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// --- Tag engine ---

pub async fn api_add_tag(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddTagRequest>,
) -> impl IntoResponse {
    let (Some(lead_id), Some(type_str), Some(created_by)) =
        (body.lead_id, body.tag_type, body.created_by)
    else {
        return bad_request("leadId, tagType, and createdBy are required");
    };

    // Unknown tag types are rejected; duplicates of a known type are not.
    let Some(tag_type) = TagType::parse(&type_str) else {
        return bad_request(&format!("unknown tag type '{type_str}'"));
    };

    match state.controller.add_tag(lead_id, tag_type, &created_by).await {
        Ok(TagAdd::Added(tag)) => Json(serde_json::json!({
            "status": "added",
            "tagId": tag.id,
        }))
        .into_response(),
        Ok(TagAdd::Duplicate) => Json(serde_json::json!({
            "status": "duplicate",
        }))
        .into_response(),
        Err(e) => domain_error(e, "add tag"),
    }
}

pub async fn api_lead_tags(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.tags.for_lead(lead_id).await {
        Ok(tags) => Json(tags).into_response(),
        Err(e) => {
            warn!(error = %e, %lead_id, "failed to load lead tags");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// --- Sessions ---

pub async fn api_start_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SessionRequest>,
) -> impl IntoResponse {
    let Some(user_name) = body.user_name.filter(|u| !u.is_empty()) else {
        return bad_request("userName is required");
    };

    match state.sessions.start(&user_name).await {
        Ok(session) => Json(session).into_response(),
        Err(e) => {
            warn!(error = %e, user_name, "failed to start session");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn api_end_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SessionRequest>,
) -> impl IntoResponse {
    let Some(user_name) = body.user_name.filter(|u| !u.is_empty()) else {
        return bad_request("userName is required");
    };

    match state.sessions.end_open(&user_name).await {
        Ok(Some(session)) => Json(session).into_response(),
        Ok(None) => Json(serde_json::json!({
            "message": "no active session to end",
        }))
        .into_response(),
        Err(e) => {
            warn!(error = %e, user_name, "failed to end session");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn api_active_session(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ActiveSessionQuery>,
) -> impl IntoResponse {
    let Some(user_name) = params.user_name.filter(|u| !u.is_empty()) else {
        return bad_request("userName is required");
    };

    match state.sessions.active(&user_name).await {
        Ok(session) => Json(session).into_response(),
        Err(e) => {
            warn!(error = %e, user_name, "failed to load active session");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// --- Pipeline ---

pub async fn api_move_lead(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MoveLeadRequest>,
) -> impl IntoResponse {
    let (Some(lead_id), Some(stage_str), Some(user_name)) =
        (body.lead_id, body.new_stage, body.user_name)
    else {
        return bad_request("leadId, newStage, and userName are required");
    };

    let Some(new_stage) = Stage::parse(&stage_str) else {
        return bad_request(&format!("unknown stage '{stage_str}'"));
    };

    match state.controller.move_stage(lead_id, new_stage, &user_name).await {
        Ok(()) => Json(serde_json::json!({"stage": new_stage})).into_response(),
        Err(e) => domain_error(e, "move lead"),
    }
}

pub async fn api_add_note(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NoteRequest>,
) -> impl IntoResponse {
    let (Some(lead_id), Some(note), Some(user_name)) = (body.lead_id, body.note, body.user_name)
    else {
        return bad_request("leadId, note, and userName are required");
    };
    if note.trim().is_empty() {
        return bad_request("note must not be empty");
    }

    match state.controller.add_note(lead_id, &note, &user_name).await {
        Ok(activity) => Json(serde_json::json!({"activityId": activity.id})).into_response(),
        Err(e) => domain_error(e, "add note"),
    }
}

pub async fn api_create_lead(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateLeadRequest>,
) -> impl IntoResponse {
    let Some(company_id) = body.company_id else {
        return bad_request("companyId is required");
    };

    match state.companies.exists(company_id).await {
        Ok(false) => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": format!("company {company_id} not found")})),
            )
                .into_response();
        }
        Ok(true) => {}
        Err(e) => {
            warn!(error = %e, %company_id, "failed to check company");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    match state.leads.create(company_id).await {
        Ok(lead) => Json(lead).into_response(),
        Err(e) => {
            warn!(error = %e, %company_id, "failed to create lead");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn api_list_leads(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListLeadsQuery>,
) -> impl IntoResponse {
    let Some(company_id) = params.company_id else {
        return bad_request("companyId is required");
    };

    match state.leads.list_by_company(company_id).await {
        Ok(leads) => Json(leads).into_response(),
        Err(e) => {
            warn!(error = %e, %company_id, "failed to list leads");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn api_lead_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.leads.get(id).await {
        Ok(Some(lead)) => Json(lead).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": format!("lead {id} not found")})),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, lead_id = %id, "failed to load lead");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// --- Tenants ---

pub async fn api_create_company(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateCompanyRequest>,
) -> impl IntoResponse {
    let (Some(name), Some(slug)) = (body.name, body.slug) else {
        return bad_request("name and slug are required");
    };
    if name.trim().is_empty() || slug.trim().is_empty() {
        return bad_request("name and slug must not be empty");
    }

    match state.companies.create(&name, &slug).await {
        Ok(company) => Json(company).into_response(),
        Err(e) => {
            warn!(error = %e, slug, "failed to create company");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track_request(lead: bool, company: bool, user: bool, action: Option<&str>) -> TrackRequest {
        TrackRequest {
            lead_id: lead.then(Uuid::new_v4),
            company_id: company.then(Uuid::new_v4),
            session_id: None,
            user_name: user.then(|| "nick".to_string()),
            action: action.map(str::to_string),
            action_data: None,
        }
    }

    #[test]
    fn track_requires_lead_and_action() {
        assert!(validate_track(track_request(false, true, true, Some("call_started"))).is_err());
        assert!(validate_track(track_request(true, true, true, None)).is_err());
        assert!(validate_track(track_request(true, true, true, Some(""))).is_err());
    }

    #[test]
    fn track_requires_company_and_user() {
        assert!(validate_track(track_request(true, false, true, Some("call_started"))).is_err());
        assert!(validate_track(track_request(true, true, false, Some("call_started"))).is_err());
    }

    #[test]
    fn valid_track_builds_activity() {
        let activity =
            validate_track(track_request(true, true, true, Some("call_started"))).unwrap();
        assert_eq!(activity.action, "call_started");
        assert!(activity.session_id.is_none());
        assert_eq!(activity.action_data, serde_json::json!({}));
    }

    #[test]
    fn track_carries_session_and_data() {
        let session_id = Uuid::new_v4();
        let mut req = track_request(true, true, true, Some("owner_email_added"));
        req.session_id = Some(session_id);
        req.action_data = Some(serde_json::json!({"email": "x@y.com"}));

        let activity = validate_track(req).unwrap();
        assert_eq!(activity.session_id, Some(session_id));
        assert_eq!(activity.action_data["email"], "x@y.com");
    }
}
