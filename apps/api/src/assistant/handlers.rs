//! Axum route handlers for the assistant: the form page and the action API.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Html,
    Json,
};
use serde::Serialize;

use crate::assistant::action::Action;
use crate::assistant::collector::InputCollector;
use crate::errors::AppError;
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ActionInfo {
    pub action: Action,
    pub slug: &'static str,
    pub label: &'static str,
    pub busy_message: &'static str,
    pub result_title: &'static str,
}

impl From<Action> for ActionInfo {
    fn from(action: Action) -> Self {
        Self {
            action,
            slug: action.slug(),
            label: action.button_label(),
            busy_message: action.busy_message(),
            result_title: action.result_title(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub action: Action,
    pub title: &'static str,
    pub text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /
pub async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /api/v1/actions
///
/// Lists the six actions in display order so the page can render its buttons.
pub async fn handle_list_actions() -> Json<Vec<ActionInfo>> {
    Json(Action::ALL.into_iter().map(ActionInfo::from).collect())
}

/// POST /api/v1/actions/:action
///
/// Validates both inputs, then issues exactly one generation call.
/// The returned text is passed through unmodified.
pub async fn handle_run_action(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    payload: Result<Json<InputCollector>, JsonRejection>,
) -> Result<Json<ActionResponse>, AppError> {
    let action = slug
        .parse::<Action>()
        .map_err(|e| AppError::NotFound(e.to_string()))?;
    let Json(inputs) = payload?;

    let submission = inputs.submit(action)?;
    let text = state.generator.run(&submission).await?;

    Ok(Json(ActionResponse {
        action,
        title: action.result_title(),
        text,
    }))
}
