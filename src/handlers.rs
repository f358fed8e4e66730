use crate::chart::{self, Container, PlotSpecRenderer, DEFAULT_TITLE};
use crate::chart_data;
use crate::errors::AppError;
use crate::models::{ChartMeta, ChartQuery, ChartResponse, CounterRequest, CounterResponse, LoginRequest};
use crate::recipes;
use crate::session::{expired_session_cookie, session_cookie, session_id, AuthState};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::{Html, IntoResponse, Redirect},
    Json,
};
use tracing::warn;

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let client = state.sessions.client_for(session_id(&headers).as_deref()).await;
    let value = match state.counter.get_value(&client).await {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("counter unavailable: {err}");
            None
        }
    };
    Html(render_index(value, &recipes::catalog()))
}

pub async fn get_counter(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CounterResponse>, AppError> {
    let client = state.sessions.client_for(session_id(&headers).as_deref()).await;
    let value = state.counter.get_value(&client).await?;
    Ok(Json(CounterResponse { value }))
}

pub async fn counter(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CounterRequest>,
) -> Result<Json<CounterResponse>, AppError> {
    let client = state.sessions.client_for(session_id(&headers).as_deref()).await;
    let value = match payload.action.trim() {
        "increment" => state.counter.increment(&client).await?,
        "decrement" => state.counter.decrement(&client).await?,
        _ => return Err(AppError::bad_request("action must be 'increment' or 'decrement'")),
    };
    Ok(Json(CounterResponse { value }))
}

pub async fn counter_increment(State(state): State<AppState>, headers: HeaderMap) -> Result<Redirect, AppError> {
    let client = state.sessions.client_for(session_id(&headers).as_deref()).await;
    state.counter.increment(&client).await?;
    Ok(Redirect::to("/"))
}

pub async fn counter_decrement(State(state): State<AppState>, headers: HeaderMap) -> Result<Redirect, AppError> {
    let client = state.sessions.client_for(session_id(&headers).as_deref()).await;
    state.counter.decrement(&client).await?;
    Ok(Redirect::to("/"))
}

pub async fn list_charts() -> Json<Vec<ChartMeta>> {
    Json(recipes::catalog())
}

pub async fn get_chart(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(kind): Path<String>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ChartResponse>, AppError> {
    let client = state.sessions.client_for(session_id(&headers).as_deref()).await;
    let series = chart_data::get_chart_series(&client).await?;
    let container = Container {
        width: query.width.unwrap_or_default(),
    };
    let title = query.title.as_deref().unwrap_or(DEFAULT_TITLE);

    let handle = chart::create(
        &PlotSpecRenderer,
        &container,
        &series.labels,
        &series.values,
        title,
        &kind,
    );

    Ok(Json(ChartResponse {
        kind: handle.kind().key(),
        labels: handle.labels().to_vec(),
        plot: handle.into_chart(),
    }))
}

pub async fn get_session(State(state): State<AppState>, headers: HeaderMap) -> Json<AuthState> {
    Json(state.sessions.snapshot(session_id(&headers).as_deref()).await)
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::bad_request("email and password are required"));
    }
    let (id, auth) = state
        .sessions
        .login(session_id(&headers).as_deref(), payload.email.trim(), &payload.password)
        .await
        .map_err(|err| AppError::unauthorized(format!("Login failed: {err}")))?;
    Ok(([(SET_COOKIE, session_cookie(&id))], Json(auth)))
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    state.sessions.logout(session_id(&headers).as_deref()).await;
    ([(SET_COOKIE, expired_session_cookie())], Json(AuthState::default()))
}
