use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::RecordStore,
    endpoints::{health::index::handler as health_handler, predict::index::handler as predict_handler},
    model::PopularityClassifier,
    works::WorkSource,
};

/// Read-only context handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<PopularityClassifier>,
    pub source: Arc<dyn WorkSource>,
    /// `None` when no database credentials were configured or the pool failed.
    pub store: Option<Arc<dyn RecordStore>>,
}

impl AppState {
    pub fn new(
        classifier: PopularityClassifier,
        source: Arc<dyn WorkSource>,
        store: Option<Arc<dyn RecordStore>>,
    ) -> Self {
        Self {
            classifier: Arc::new(classifier),
            source,
            store,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(predict_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
