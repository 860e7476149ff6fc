///! HTTP routes for the viewer
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use dexview_core::{Pager, QueryClient, Spotlight};

use crate::view;

pub struct AppState {
    pub query: QueryClient,
    pub pager: Pager,
    pub spotlight: Spotlight,
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(home))
        .route("/pokemon/{id}", get(detail))
        .route("/spotlight/next", get(spotlight_next))
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ListParams {
    /// 0-indexed page number; shareable via the URL.
    page: Option<u32>,
    /// Server-side rendition of the name filter (the in-page script takes
    /// over once loaded).
    q: Option<String>,
}

/// List view: paginated grid plus the spotlight card.
async fn home(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Html<String> {
    let page = params.page.unwrap_or(0);
    let grid = state.pager.goto(page).await;
    if let Err(err) = &grid {
        tracing::warn!("list page {} failed: {}", page, err);
    }

    let spotlight_id = state.spotlight.current().await;
    let spotlight = state.query.detail(spotlight_id).await;
    if let Err(err) = &spotlight {
        tracing::warn!("spotlight {} failed: {}", spotlight_id, err);
    }

    Html(view::render_home(
        &grid,
        &spotlight,
        params.q.as_deref().unwrap_or(""),
    ))
}

/// Detail view for one record.
async fn detail(State(state): State<Arc<AppState>>, Path(id): Path<u32>) -> Response {
    match state.query.detail(id).await {
        Ok(detail) => Html(view::render_detail(&detail)).into_response(),
        Err(err) if err.is_not_found() => {
            (StatusCode::NOT_FOUND, Html(view::render_detail_error(id, &err))).into_response()
        }
        Err(err) => {
            tracing::warn!("detail {} failed: {}", id, err);
            Html(view::render_detail_error(id, &err)).into_response()
        }
    }
}

/// Reroll the spotlight and bounce back to the list; doubles as the retry
/// affordance when the current spotlight fetch keeps failing.
async fn spotlight_next(State(state): State<Arc<AppState>>) -> Redirect {
    let id = state.spotlight.reroll().await;
    tracing::debug!("spotlight now on {}", id);
    Redirect::to("/")
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(view::render_not_found())).into_response()
}
