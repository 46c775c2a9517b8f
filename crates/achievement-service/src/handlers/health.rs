use axum::Json;
use serde_json::{Value, json};

/// 存活探针
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
