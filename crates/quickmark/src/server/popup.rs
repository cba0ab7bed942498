//! Popup session endpoints.
//!
//! The frontend forwards its input events here and renders the returned
//! [`PopupView`]. One session is open at a time; opening a new one replaces it.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::host::{CloseRequest, HostFrame};
use crate::picker::{KeyOutcome, PickerKey};
use crate::popup::{ConfirmOutcome, Popup, PopupView};
use crate::server::error::ApiError;
use crate::server::ServerState;
use crate::store::ActiveTab;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPopupRequest {
    #[serde(default)]
    pub embedded: bool,
    #[serde(default)]
    pub tab: Option<ActiveTab>,
}

#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct InputRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct KeyRequest {
    pub key: PickerKey,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub index: usize,
}

#[derive(Debug, Serialize)]
pub struct KeyResponse {
    pub outcome: KeyOutcome,
    pub popup: PopupView,
}

fn no_popup() -> ApiError {
    ApiError::not_found("no popup is open")
}

/// POST /popup
pub(crate) async fn open(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<OpenPopupRequest>,
) -> Result<Json<PopupView>, ApiError> {
    let store = state.store(payload.tab).await?;
    let host = HostFrame::detect(payload.embedded, &state.config.host_message_tag);
    let popup = Popup::open(store, &state.config, host).await;
    let view = popup.view();
    *state.popup.lock().await = Some(popup);
    Ok(Json(view))
}

/// GET /popup
pub(crate) async fn view(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<PopupView>, ApiError> {
    let guard = state.popup.lock().await;
    let popup = guard.as_ref().ok_or_else(no_popup)?;
    Ok(Json(popup.view()))
}

/// POST /popup/title
pub(crate) async fn set_title(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<TitleRequest>,
) -> Result<Json<PopupView>, ApiError> {
    let mut guard = state.popup.lock().await;
    let popup = guard.as_mut().ok_or_else(no_popup)?;
    popup.set_title(payload.title);
    Ok(Json(popup.view()))
}

/// POST /popup/picker/input
pub(crate) async fn input(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<InputRequest>,
) -> Result<Json<PopupView>, ApiError> {
    let mut guard = state.popup.lock().await;
    let popup = guard.as_mut().ok_or_else(no_popup)?;
    popup.picker_mut().input_changed(payload.text);
    Ok(Json(popup.view()))
}

/// POST /popup/picker/key
pub(crate) async fn key(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<KeyRequest>,
) -> Result<Json<KeyResponse>, ApiError> {
    let mut guard = state.popup.lock().await;
    let popup = guard.as_mut().ok_or_else(no_popup)?;
    let outcome = popup.picker_mut().key(payload.key);
    Ok(Json(KeyResponse {
        outcome,
        popup: popup.view(),
    }))
}

/// POST /popup/picker/select
pub(crate) async fn select(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<SelectRequest>,
) -> Result<Json<PopupView>, ApiError> {
    let mut guard = state.popup.lock().await;
    let popup = guard.as_mut().ok_or_else(no_popup)?;
    popup.picker_mut().select(payload.index)?;
    Ok(Json(popup.view()))
}

/// POST /popup/picker/focus
pub(crate) async fn focus(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<PopupView>, ApiError> {
    let mut guard = state.popup.lock().await;
    let popup = guard.as_mut().ok_or_else(no_popup)?;
    popup.picker_mut().focus();
    Ok(Json(popup.view()))
}

/// POST /popup/picker/blur
///
/// Arms the auto-select timer and fires it from a background task. The
/// frontend sees the outcome on its next `GET /popup`.
pub(crate) async fn blur(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<PopupView>, ApiError> {
    let mut guard = state.popup.lock().await;
    let popup = guard.as_mut().ok_or_else(no_popup)?;
    popup.picker_mut().blur(Instant::now());
    let delay = popup.picker().blur_select_delay();

    let timer_state = state.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if let Some(popup) = timer_state.popup.lock().await.as_mut() {
            if popup.picker_mut().poll(Instant::now()) {
                tracing::debug!("blur selected folder {:?}", popup.picker().selected_folder_id());
            }
        }
    });

    Ok(Json(popup.view()))
}

/// POST /popup/folders/refresh
pub(crate) async fn refresh_folders(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<PopupView>, ApiError> {
    let mut guard = state.popup.lock().await;
    let popup = guard.as_mut().ok_or_else(no_popup)?;
    popup.refresh_folders().await?;
    Ok(Json(popup.view()))
}

/// POST /popup/confirm
///
/// A successful save ends the session.
pub(crate) async fn confirm(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<ConfirmOutcome>, ApiError> {
    let mut guard = state.popup.lock().await;
    let popup = guard.as_mut().ok_or_else(no_popup)?;
    let outcome = popup.confirm().await;
    if matches!(outcome, ConfirmOutcome::Saved { .. }) {
        *guard = None;
        state.forget_folders().await;
    }
    Ok(Json(outcome))
}

/// POST /popup/cancel
pub(crate) async fn cancel(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<CloseRequest>, ApiError> {
    let popup = state.popup.lock().await.take().ok_or_else(no_popup)?;
    Ok(Json(popup.cancel()))
}
