use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{ApiError, AppState};
use crate::flows::{list_permissions, FlowStream, PermissionListing};
use crate::schema::SchemaDefinition;
use crate::types::{BrowserId, ItemId, SubjectKey};

/// Cookie carrying the browser identifier
pub const SESSION_COOKIE: &str = "userUUID";

const COOKIE_LIFETIME_DAYS: i64 = 365;

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginStatus {
    pub status: bool,
}

/// GET /api/login
pub(super) async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar, Json<LoginStatus>), ApiError> {
    let browser = browser_id(&jar).unwrap_or_else(|| {
        let browser = BrowserId::random();
        tracing::info!(?browser, "Issued browser identifier");
        browser
    });

    let bound = state.store.get_session(&browser).await?.is_some();
    let status = if bound {
        StatusCode::OK
    } else {
        StatusCode::ACCEPTED
    };

    Ok((
        status,
        jar.add(session_cookie(browser)),
        Json(LoginStatus { status: bound }),
    ))
}

/// GET /api/auth
pub(super) async fn auth_events(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let browser = browser_id(&jar).ok_or(ApiError::MissingCookie)?;
    let flow = state.pairing.start(browser, &state.shutdown);
    Ok(event_stream("Login", flow.events))
}

/// GET /api/request/:id
pub(super) async fn permission_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let item = ItemId::parse(&id).map_err(|_| ApiError::InvalidItem(id))?;
    let subject = paired_subject(&state, &jar).await?;
    let flow = state.permission.start(item, subject, &state.shutdown);
    Ok(event_stream("Permission", flow.events))
}

/// GET /api/dag
pub(super) async fn schema_definition(State(state): State<AppState>) -> Json<SchemaDefinition> {
    Json(state.schema.definition().clone())
}

/// GET /api/user/permissions
pub(super) async fn user_permissions(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<PermissionListing>, ApiError> {
    let subject = paired_subject(&state, &jar).await?;
    let listing = list_permissions(state.store.as_ref(), &state.multiplexer, subject).await?;
    Ok(Json(listing))
}

fn browser_id(jar: &CookieJar) -> Option<BrowserId> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| BrowserId::from_cookie(cookie.value()).ok())
}

async fn paired_subject(state: &AppState, jar: &CookieJar) -> Result<SubjectKey, ApiError> {
    let browser = browser_id(jar).ok_or(ApiError::MissingCookie)?;
    state
        .store
        .get_session(&browser)
        .await?
        .ok_or(ApiError::NotPaired)
}

fn session_cookie(browser: BrowserId) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, browser.to_cookie()))
        .path("/")
        .expires(OffsetDateTime::now_utc() + time::Duration::days(COOKIE_LIFETIME_DAYS))
        .build()
}

fn event_stream(
    name: &'static str,
    events: FlowStream,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = events.map(move |message| {
        let json = serde_json::to_string(&message).unwrap_or_default();
        Ok(Event::default().event(name).data(json))
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(std::time::Duration::from_secs(15))
            .text("ping"),
    )
}
