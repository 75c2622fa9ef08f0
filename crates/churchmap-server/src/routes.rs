use crate::metrics::op;
use crate::state::AppState;
use axum::http::StatusCode;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use churchmap_core::{
    Bounds, Feature, FeatureId, FilterField, MapCommand, MapError, Profile, SessionView,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct ApiError(MapError);

impl From<MapError> for ApiError {
    fn from(e: MapError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            MapError::NotFound | MapError::SessionNotFound => StatusCode::NOT_FOUND,
            MapError::UnknownField(_) | MapError::Invalid(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, Json(json!({"error": self.0.to_string()}))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/status", get(status))
        .route("/v1/features/:id", get(get_feature))
        .route("/v1/sessions", post(create_session))
        .route("/v1/sessions/:sid", delete(delete_session))
        .route("/v1/sessions/:sid/viewport", put(viewport))
        .route("/v1/sessions/:sid/filters/:field", put(filter_input))
        .route("/v1/sessions/:sid/filters/:field/select", post(filter_select))
        .route("/v1/sessions/:sid/suggest/:field", get(suggest))
        .route("/v1/sessions/:sid/reset", post(reset))
        .route("/v1/sessions/:sid/zoom-to-filter", post(zoom_to_filter))
        .route("/v1/sessions/:sid/list-search", put(list_search))
        .route("/v1/sessions/:sid/select/:id", post(select))
        .route("/v1/sessions/:sid/view", get(view))
        .route("/metrics", get(metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn status(State(app): State<AppState>) -> impl IntoResponse {
    let snapshot = app.store.snapshot();
    Json(json!({
        "message": app.status_message(),
        "loaded": app.store.is_loaded(),
        "features": snapshot.len(),
        "progress": app.store.progress(),
        "report": app.store.report(),
    }))
}

async fn get_feature(
    State(app): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Feature>> {
    let snapshot = app.store.snapshot();
    let f = snapshot.get(FeatureId(id)).ok_or(MapError::NotFound)?;
    Ok(Json(f.clone()))
}

#[derive(Debug, Default, Deserialize)]
struct CreateSession {
    viewport_width: Option<u32>,
    viewport: Option<Bounds>,
}

async fn create_session(
    State(app): State<AppState>,
    Json(req): Json<CreateSession>,
) -> impl IntoResponse {
    let profile = req
        .viewport_width
        .map(Profile::for_viewport_width)
        .unwrap_or_default();
    let handle = app.create_session(profile, req.viewport);
    handle.refresh(&app.store).await;
    op("create_session");
    tracing::info!(session = %handle.id, ?profile, "session created");
    (
        StatusCode::CREATED,
        Json(json!({"id": handle.id, "profile": profile})),
    )
}

async fn delete_session(
    State(app): State<AppState>,
    Path(sid): Path<String>,
) -> ApiResult<StatusCode> {
    app.remove_session(&sid)?;
    op("delete_session");
    Ok(StatusCode::NO_CONTENT)
}

async fn viewport(
    State(app): State<AppState>,
    Path(sid): Path<String>,
    Json(bounds): Json<Bounds>,
) -> ApiResult<StatusCode> {
    let s = app.session(&sid)?;
    s.viewport_changed(&app.store, bounds);
    Ok(StatusCode::ACCEPTED)
}

#[derive(Debug, Deserialize)]
struct InputBody {
    #[serde(default)]
    value: String,
}

async fn filter_input(
    State(app): State<AppState>,
    Path((sid, field)): Path<(String, String)>,
    Json(body): Json<InputBody>,
) -> ApiResult<StatusCode> {
    let s = app.session(&sid)?;
    let field: FilterField = field.parse()?;
    s.input_changed(&app.store, field, &body.value);
    Ok(StatusCode::ACCEPTED)
}

async fn filter_select(
    State(app): State<AppState>,
    Path((sid, field)): Path<(String, String)>,
    Json(body): Json<InputBody>,
) -> ApiResult<impl IntoResponse> {
    let s = app.session(&sid)?;
    let field: FilterField = field.parse()?;
    let summary = s.suggestion_selected(&app.store, field, &body.value).await;
    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
struct SuggestQuery {
    #[serde(default)]
    q: String,
}

async fn suggest(
    State(app): State<AppState>,
    Path((sid, field)): Path<(String, String)>,
    Query(q): Query<SuggestQuery>,
) -> ApiResult<Json<Vec<String>>> {
    let s = app.session(&sid)?;
    let field: FilterField = field.parse()?;
    let limit = s.profile().suggest_limit();
    let snapshot = app.store.snapshot();
    Ok(Json(snapshot.unique().suggest(field, &q.q, limit)))
}

async fn reset(
    State(app): State<AppState>,
    Path(sid): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let s = app.session(&sid)?;
    let summary = s.reset(&app.store).await;
    op("reset");
    Ok(Json(summary))
}

async fn zoom_to_filter(
    State(app): State<AppState>,
    Path(sid): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let s = app.session(&sid)?;
    let zoomed = s.zoom_to_filter();
    Ok(Json(json!({"zoomed": zoomed})))
}

#[derive(Debug, Deserialize)]
struct ListSearchBody {
    #[serde(default)]
    query: String,
}

async fn list_search(
    State(app): State<AppState>,
    Path(sid): Path<String>,
    Json(body): Json<ListSearchBody>,
) -> ApiResult<StatusCode> {
    let s = app.session(&sid)?;
    s.list_search_changed(&body.query);
    Ok(StatusCode::ACCEPTED)
}

async fn select(
    State(app): State<AppState>,
    Path((sid, id)): Path<(String, u64)>,
) -> ApiResult<StatusCode> {
    let s = app.session(&sid)?;
    s.select(&app.store, FeatureId(id))?;
    op("select");
    Ok(StatusCode::ACCEPTED)
}

/// What the page pulls after each interaction. `markers` carries the full
/// features of the newest marker set, present only when it changed.
#[derive(Debug, Serialize)]
pub struct ViewResponse {
    #[serde(flatten)]
    pub view: SessionView,
    pub commands: Vec<MapCommand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markers: Option<Vec<Feature>>,
}

async fn view(
    State(app): State<AppState>,
    Path(sid): Path<String>,
) -> ApiResult<Json<ViewResponse>> {
    let s = app.session(&sid)?;
    let view = s.with_entry(|e| e.session.view());
    let commands = s.drain_commands();
    let snapshot = app.store.snapshot();
    let markers = commands.iter().rev().find_map(|c| match c {
        MapCommand::ReplaceMarkers { ids } => Some(
            ids.iter()
                .filter_map(|id| snapshot.get(*id).cloned())
                .collect::<Vec<_>>(),
        ),
        _ => None,
    });
    Ok(Json(ViewResponse {
        view,
        commands,
        markers,
    }))
}

async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::warn!(error = %e, "metrics encoding failed");
    }
    (StatusCode::OK, String::from_utf8(buf).unwrap_or_default())
}
