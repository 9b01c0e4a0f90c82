use axum::{
	extract::{rejection::JsonRejection, Json, State},
	http::StatusCode,
	response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, warn};

use crate::{
	app::AppState,
	db::{InsertPredictionError, InsertedRecord},
	pipeline::{persist_prediction, predict_work},
	works::FetchWorkError,
};

/// JSON payload expected by the endpoint. `url` is kept loose so a
/// non-string value fails at the fetch stage rather than as a bad body.
#[derive(Deserialize)]
pub struct PredictRequest {
	url: Option<Value>,
}

/// Empty values (null, false, 0, blank text, empty list or object) count as
/// no url. Any other non-string value cannot name a work.
fn requested_url(url: Option<Value>) -> Result<String, HandlerError> {
	match url {
		None | Some(Value::Null) | Some(Value::Bool(false)) => Err(HandlerError::UrlRequired),
		Some(Value::String(url)) if url.trim().is_empty() => Err(HandlerError::UrlRequired),
		Some(Value::String(url)) => Ok(url),
		Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Err(HandlerError::UrlRequired),
		Some(Value::Array(items)) if items.is_empty() => Err(HandlerError::UrlRequired),
		Some(Value::Object(fields)) if fields.is_empty() => Err(HandlerError::UrlRequired),
		Some(other) => Err(FetchWorkError::InvalidUrl {
			url: other.to_string(),
		}
		.into()),
	}
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
	pub status: &'static str,
	pub message: &'static str,
	pub inserted_record: InsertedRecord,
}

#[derive(Debug, Error)]
pub enum HandlerError {
	#[error("InvalidBody: {source}")]
	InvalidBody {
		#[from]
		source: JsonRejection,
	},
	#[error("UrlRequired")]
	UrlRequired,
	#[error("PredictWork: {source}")]
	PredictWork {
		#[from]
		source: FetchWorkError,
	},
	#[error("StoreUnavailable")]
	StoreUnavailable,
	#[error("PersistPrediction: {source}")]
	PersistPrediction {
		#[from]
		source: InsertPredictionError,
	},
}

impl IntoResponse for HandlerError {
	fn into_response(self) -> axum::response::Response {
		match self {
			HandlerError::InvalidBody { source } => {
				warn!(error = %source, "Rejected request body");
				(StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid JSON body" }))).into_response()
			}
			HandlerError::UrlRequired => {
				(StatusCode::BAD_REQUEST, Json(json!({ "error": "url is required!" }))).into_response()
			}
			HandlerError::PredictWork { source } => {
				error!(error = %source, "Prediction failed");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					Json(json!({ "error": "Failed to fetch work details or make prediction." })),
				)
					.into_response()
			}
			HandlerError::StoreUnavailable => {
				error!("No record store configured");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					Json(json!({ "error": "Failed to connect to Supabase." })),
				)
					.into_response()
			}
			HandlerError::PersistPrediction { source } => {
				error!(error = %source, "Insert failed");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					Json(json!({
						"status": "error",
						"message": format!("failed to insert the data: {source}"),
					})),
				)
					.into_response()
			}
		}
	}
}

/// Axum handler: POST /predict
pub async fn handler(
	State(state): State<AppState>,
	payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PredictResponse>), HandlerError> {
	let Json(input) = payload?;

	let url = requested_url(input.url)?;

	let result = predict_work(state.source.as_ref(), &state.classifier, &url).await?;

	let store = state.store.as_ref().ok_or(HandlerError::StoreUnavailable)?;
	let inserted_record = persist_prediction(store.as_ref(), &result).await?;

	Ok((
		StatusCode::CREATED,
		Json(PredictResponse {
			status: "success",
			message: "data inserted successfully into the supabase",
			inserted_record,
		}),
	))
}
