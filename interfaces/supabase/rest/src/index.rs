use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;

pub struct SupabaseRestResult {
    pub body: String,
    pub status: StatusCode,
}

impl SupabaseRestResult {
    /// Rows echoed back under `Prefer: return=representation`.
    ///
    /// Empty when the request failed or the body is not a JSON array.
    pub fn rows(&self) -> Vec<serde_json::Value> {
        if !self.status.is_success() {
            return Vec::new();
        }
        match serde_json::from_str::<serde_json::Value>(&self.body) {
            Ok(serde_json::Value::Array(rows)) => rows,
            _ => Vec::new(),
        }
    }
}

pub fn table_endpoint(project_url: &str, table: &str) -> String {
    format!("{}/rest/v1/{}", project_url.trim_end_matches('/'), table)
}

pub async fn insert_rows<T: Serialize + ?Sized>(
    client: &Client,
    project_url: &str,
    key: &str,
    table: &str,
    rows: &T,
) -> Result<SupabaseRestResult, InsertRowsError> {
    let response = client
        .post(table_endpoint(project_url, table))
        .header("apikey", key)
        .header("Authorization", format!("Bearer {key}"))
        .header("Content-Type", "application/json")
        .header("Prefer", "return=representation")
        .json(rows)
        .send()
        .await
        .map_err(|source| InsertRowsError::RequestSend { source })?;

    let status = response.status();

    let body = response
        .text()
        .await
        .map_err(|source| InsertRowsError::ResponseRead { source })?;

    Ok(SupabaseRestResult { body, status })
}

#[derive(Debug, Error)]
pub enum InsertRowsError {
    #[error("RequestSend: {source}")]
    RequestSend { source: reqwest::Error },

    #[error("ResponseRead: {source}")]
    ResponseRead { source: reqwest::Error },
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Json, Path},
        http::HeaderMap,
        routing::post,
        Router,
    };
    use serde_json::{json, Value};

    use super::*;

    /// Echoes what the insert sent as a single stored row.
    async fn echo_insert(
        Path(table): Path<String>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        (
            StatusCode::CREATED,
            Json(json!([{
                "table": table,
                "apikey": header("apikey"),
                "authorization": header("authorization"),
                "prefer": header("prefer"),
                "content_type": header("content-type"),
                "body": body,
            }])),
        )
    }

    #[tokio::test]
    async fn insert_sends_credentials_and_asks_for_the_row_back() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/rest/v1/{table}", post(echo_insert));
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let rows = vec![json!({ "title": "A", "kudos": 3 })];
        let result = insert_rows(
            &Client::new(),
            &format!("http://{addr}/"),
            "anon-key",
            "popularity_classifier",
            rows.as_slice(),
        )
        .await
        .unwrap();

        assert_eq!(result.status, StatusCode::CREATED);
        let echoed = result.rows();
        assert_eq!(echoed.len(), 1);
        let sent = &echoed[0];
        assert_eq!(sent["table"], "popularity_classifier");
        assert_eq!(sent["apikey"], "anon-key");
        assert_eq!(sent["authorization"], "Bearer anon-key");
        assert_eq!(sent["prefer"], "return=representation");
        assert_eq!(sent["content_type"], "application/json");
        assert_eq!(sent["body"], json!([{ "title": "A", "kudos": 3 }]));
    }

    #[test]
    fn joins_table_endpoint() {
        assert_eq!(
            table_endpoint("https://abc.supabase.co/", "popularity_classifier"),
            "https://abc.supabase.co/rest/v1/popularity_classifier"
        );
    }

    #[test]
    fn rows_only_for_successful_arrays() {
        let ok = SupabaseRestResult {
            body: r#"[{"title":"A"}]"#.to_string(),
            status: StatusCode::CREATED,
        };
        assert_eq!(ok.rows().len(), 1);

        let empty = SupabaseRestResult {
            body: "[]".to_string(),
            status: StatusCode::CREATED,
        };
        assert!(empty.rows().is_empty());

        let denied = SupabaseRestResult {
            body: r#"[{"title":"A"}]"#.to_string(),
            status: StatusCode::UNAUTHORIZED,
        };
        assert!(denied.rows().is_empty());

        let object = SupabaseRestResult {
            body: r#"{"message":"bad"}"#.to_string(),
            status: StatusCode::OK,
        };
        assert!(object.rows().is_empty());
    }
}
