use crate::errors::{AppError, CheckInError};
use crate::models::{
    Attendee, AttendeeResponse, CheckInRequest, ListQuery, SummaryResponse, TeamSummary,
};
use crate::state::AppState;
use crate::store::CheckInStore;
use crate::ui::{render_index, PageOptions};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    Form, Json,
};

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, AppError> {
    let html = state.read(|store| {
        let filter = team_filter(store, query.team.as_deref())?;
        let options = PageOptions {
            show_list: query.show.unwrap_or(0) != 0,
            filter,
            greeting: None,
        };
        Ok::<_, AppError>(render_index(store, &options))
    })??;
    Ok(Html(html))
}

pub async fn check_in_form(
    State(state): State<AppState>,
    Form(payload): Form<CheckInRequest>,
) -> Result<Html<String>, AppError> {
    let html = state
        .write(move |store| {
            let attendee = store.check_in(&payload.name, payload.team.trim())?;
            let options = PageOptions {
                greeting: Some(&attendee),
                ..PageOptions::default()
            };
            Ok::<_, CheckInError>(render_index(store, &options))
        })
        .await??;
    Ok(Html(html))
}

pub async fn check_in(
    State(state): State<AppState>,
    Json(payload): Json<CheckInRequest>,
) -> Result<(StatusCode, Json<AttendeeResponse>), AppError> {
    let response = state
        .write(move |store| {
            let attendee = store.check_in(&payload.name, payload.team.trim())?;
            Ok::<_, CheckInError>(to_response(store, &attendee))
        })
        .await??;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_summary(State(state): State<AppState>) -> Result<Json<SummaryResponse>, AppError> {
    Ok(Json(state.read(build_summary)?))
}

pub async fn get_attendees(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AttendeeResponse>>, AppError> {
    let attendees = state.read(|store| {
        let filter = team_filter(store, query.team.as_deref())?;
        Ok::<_, AppError>(
            store
                .filtered_attendees(filter)
                .into_iter()
                .map(|attendee| to_response(store, attendee))
                .collect::<Vec<_>>(),
        )
    })??;
    Ok(Json(attendees))
}

pub fn build_summary(store: &CheckInStore) -> SummaryResponse {
    let config = store.config();
    SummaryResponse {
        total: store.total(),
        goal: config.goal,
        progress_percent: store.progress_percent(),
        goal_reached: store.is_goal_reached(),
        leader: store.current_leader().map(|key| key.to_string()),
        teams: config
            .teams
            .iter()
            .map(|team| TeamSummary {
                key: team.key.to_string(),
                label: team.label.clone(),
                count: store.team_counts().get(&team.key).copied().unwrap_or(0),
            })
            .collect(),
    }
}

fn team_filter<'a>(store: &CheckInStore, team: Option<&'a str>) -> Result<Option<&'a str>, AppError> {
    match team.map(str::trim) {
        None | Some("") => Ok(None),
        Some(team) if store.config().is_known(team) => Ok(Some(team)),
        Some(team) => Err(AppError::bad_request(format!("unknown team '{team}'"))),
    }
}

fn to_response(store: &CheckInStore, attendee: &Attendee) -> AttendeeResponse {
    AttendeeResponse {
        name: attendee.name.clone(),
        team: attendee.team.to_string(),
        team_label: store.config().label_for(attendee.team.as_str()).to_string(),
        ts: attendee.timestamp,
    }
}
