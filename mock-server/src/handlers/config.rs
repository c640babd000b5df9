use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::{detail, ApiResult, Db};

/// Sections whose changes only apply after a restart.
const RESTART_SECTIONS: [&str; 2] = ["server", "cors"];

#[derive(Debug, Deserialize)]
pub struct Probe {
    #[serde(default = "default_service_type")]
    service_type: String,
    #[serde(default)]
    base_url: String,
    #[serde(default)]
    model: String,
    dimensions: Option<u32>,
}

fn default_service_type() -> String {
    "openai-compatible".to_string()
}

impl Probe {
    fn check(&self) -> ApiResult<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(detail(StatusCode::BAD_REQUEST, format!("cannot reach `{}`", self.base_url)));
        }
        if self.model.is_empty() {
            return Err(detail(StatusCode::BAD_REQUEST, "model must be set"));
        }
        Ok(())
    }
}

pub async fn get_config(State(db): State<Db>) -> Json<Value> {
    Json(json!({ "data": db.read().await.config }))
}

pub async fn update_config(
    State(db): State<Db>,
    Json(changes): Json<Map<String, Value>>,
) -> ApiResult<Json<Value>> {
    let mut backend = db.write().await;
    let Value::Object(current) = &mut backend.config else {
        return Err(detail(StatusCode::INTERNAL_SERVER_ERROR, "config is not an object"));
    };
    let mut changed_keys = Vec::new();
    for (key, value) in changes {
        if current.get(&key) != Some(&value) {
            changed_keys.push(key.clone());
            current.insert(key, value);
        }
    }
    let needs_restart = changed_keys.iter().any(|k| RESTART_SECTIONS.contains(&k.as_str()));
    backend.log_server(format!("config updated: {changed_keys:?}"));
    Ok(Json(json!({
        "message": "config updated",
        "changed_keys": changed_keys,
        "needs_restart": needs_restart
    })))
}

pub async fn test_llm(Json(probe): Json<Probe>) -> ApiResult<Json<Value>> {
    probe.check()?;
    Ok(Json(json!({
        "message": "LLM config test succeeded",
        "data": {
            "connected": true,
            "model": probe.model,
            "service_type": probe.service_type,
            "response_preview": "ok"
        }
    })))
}

pub async fn test_embedding(Json(probe): Json<Probe>) -> ApiResult<Json<Value>> {
    probe.check()?;
    Ok(Json(json!({
        "message": "embedding config test succeeded",
        "data": {
            "connected": true,
            "model": probe.model,
            "service_type": probe.service_type,
            "dimensions": probe.dimensions.unwrap_or(1024)
        }
    })))
}
