//! HTTP host: serves the page, the callback endpoint and a small JSON API.

use crate::charts::{RenderError, StaticChartRenderer};
use crate::config::AppConfig;
use crate::data::{ChartDescription, DataProcessor, GasTable, Selection};
use crate::web::callbacks::{
    CallbackError, CallbackRegistry, DispatchRequest, DispatchResponse, Slot,
};
use crate::web::layout::{Component, Layout};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub const CHECKLIST_ID: &str = "checklist";
pub const GRAPH_ID: &str = "graph-content";

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Callback(#[from] CallbackError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::Callback(CallbackError::Render(_))
            | ServerError::Callback(CallbackError::Encode { .. })
            | ServerError::Render(_)
            | ServerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Callback(_) => StatusCode::BAD_REQUEST,
        };

        if status.is_server_error() {
            error!("request failed: {}", self);
        } else {
            warn!("rejected request: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Output of the graph callback: the data plus its drawing.
#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub chart: ChartDescription,
    pub svg: String,
}

/// Read-only data every render works from.
pub struct Dashboard {
    table: GasTable,
    config: AppConfig,
}

impl Dashboard {
    pub fn new(table: GasTable, config: AppConfig) -> Self {
        Self { table, config }
    }

    pub fn table(&self) -> &GasTable {
        &self.table
    }

    pub fn figure(&self, selection: &Selection) -> Result<Figure, RenderError> {
        let chart = DataProcessor::render(&self.table, selection);
        let svg = StaticChartRenderer::render_svg(&chart, self.config.chart_size)?;
        Ok(Figure { chart, svg })
    }

    /// The page as first served, drawn with the default selection.
    pub fn layout(&self) -> Result<Layout, RenderError> {
        let selection: Selection = self.config.default_selection.iter().cloned().collect();
        let figure = self.figure(&selection)?;

        Ok(Layout::new(self.config.title.clone())
            .with(Component::Heading {
                text: self.config.title.clone(),
            })
            .with(Component::Graph {
                id: GRAPH_ID.to_string(),
                svg: figure.svg,
            })
            .with(Component::Checklist {
                id: CHECKLIST_ID.to_string(),
                options: self.table.cities(),
                value: self.config.default_selection.clone(),
                inline: true,
            }))
    }
}

fn update_graph(dashboard: &Dashboard, selection: Selection) -> Result<Figure, CallbackError> {
    let figure = dashboard.figure(&selection)?;
    debug!(
        selected = ?selection,
        series = figure.chart.series.len(),
        "redrew graph"
    );
    Ok(figure)
}

pub struct AppState {
    dashboard: Dashboard,
    callbacks: CallbackRegistry<Dashboard>,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Result<Self, CallbackError> {
        let mut callbacks = CallbackRegistry::new();
        callbacks.register_typed(
            Slot::new(CHECKLIST_ID, "value"),
            Slot::new(GRAPH_ID, "figure"),
            update_graph,
        )?;
        Ok(Self {
            dashboard,
            callbacks,
        })
    }
}

async fn index_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, ServerError> {
    let layout = state.dashboard.layout()?;
    Ok(Html(layout.to_html()))
}

async fn dispatch_update(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DispatchRequest>,
) -> Result<Json<DispatchResponse>, ServerError> {
    debug!(input = %request.input, "dispatching update");
    let response = state.callbacks.dispatch(&state.dashboard, request)?;
    Ok(Json(response))
}

async fn list_cities(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.dashboard.table().cities())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/_update", post(dispatch_update))
        .route("/api/cities", get(list_cities))
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Dashboard running at http://{}", listener.local_addr()?);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
