use std::sync::Arc;

use axum::serve;
use projects_classifier::{
	app::{build_router, AppState},
	config::{load_dotenv, AppConfig, ConfigError},
	db::open_store,
	model::{LoadArtifactError, PopularityClassifier},
	works::Ao3Source,
};
use thiserror::Error;
use tracing::info;
use utils_trace::tracing_init;

#[derive(Debug, Error)]
pub enum MainError {
	#[error("Config: {source}")]
	Config {
		#[source]
		source: ConfigError,
	},
	#[error("TracingInit: {source}")]
	TracingInit {
		#[source]
		source: utils_trace::TracingInitError,
	},
	#[error("LoadModel: {source}")]
	LoadModel {
		#[source]
		source: LoadArtifactError,
	},
	#[error("HttpClient: {source}")]
	HttpClient {
		#[source]
		source: reqwest::Error,
	},
	#[error("TcpListenerBind: {source}")]
	TcpListenerBind {
		#[source]
		source: std::io::Error,
	},
	#[error("Serve: {source}")]
	Serve {
		#[source]
		source: std::io::Error,
	},
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
	load_dotenv().map_err(|source| MainError::Config { source })?;

	let config = AppConfig::from_env().map_err(|source| MainError::Config { source })?;

	tracing_init(&config.log_level, config.log_format)
		.map_err(|source| MainError::TracingInit { source })?;

	let classifier = PopularityClassifier::load(&config.model_path, &config.scaler_path)
		.map_err(|source| MainError::LoadModel { source })?;

	let client = reqwest::Client::builder()
		.user_agent(format!("projects_classifier/{}", env!("CARGO_PKG_VERSION")))
		.timeout(config.fetch_timeout)
		.build()
		.map_err(|source| MainError::HttpClient { source })?;

	let source = Arc::new(Ao3Source::new(client.clone(), config.ao3_base_url.clone()));
	let store = open_store(&config.store, client);

	let app = build_router(AppState::new(classifier, source, store));

	let listener = tokio::net::TcpListener::bind(config.bind_addr)
		.await
		.map_err(|source| MainError::TcpListenerBind { source })?;

	info!("Server running on addr: {}", config.bind_addr);

	serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await
		.map_err(|source| MainError::Serve { source })?;

	Ok(())
}

async fn shutdown_signal() {
	if tokio::signal::ctrl_c().await.is_ok() {
		info!("Shutdown signal received");
	}
}
