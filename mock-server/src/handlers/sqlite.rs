use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Map, Value};

use super::Paging;
use crate::model::timestamp;
use crate::{detail, ApiResult, Db};

fn invalid_table() -> crate::ApiError {
    detail(StatusCode::BAD_REQUEST, "invalid table name")
}

pub async fn tables(State(db): State<Db>) -> Json<Value> {
    let backend = db.read().await;
    let tables: Vec<Value> = backend
        .tables
        .iter()
        .map(|(name, table)| json!({ "name": name, "count": table.rows.len() }))
        .collect();
    Json(json!({ "data": { "tables": tables } }))
}

pub async fn rows(
    State(db): State<Db>,
    Path(table): Path<String>,
    Query(paging): Query<Paging>,
) -> ApiResult<Json<Value>> {
    let backend = db.read().await;
    let table_data = backend.tables.get(&table).ok_or_else(invalid_table)?;
    let columns: Vec<Value> = table_data
        .columns
        .iter()
        .map(|c| json!({ "prop": c, "label": c, "type": if c == "id" { "INTEGER" } else { "TEXT" } }))
        .collect();
    let newest_first: Vec<&Map<String, Value>> = table_data.rows.values().rev().collect();
    Ok(Json(json!({
        "data": {
            "records": paging.window(newest_first),
            "columns": columns,
            "total": table_data.rows.len(),
            "page": paging.page,
            "size": paging.size
        }
    })))
}

pub async fn create_record(
    State(db): State<Db>,
    Path(table): Path<String>,
    Json(mut fields): Json<Map<String, Value>>,
) -> ApiResult<Json<Value>> {
    let mut backend = db.write().await;
    let table_data = backend.tables.get_mut(&table).ok_or_else(invalid_table)?;
    let id = table_data.next_id;
    table_data.next_id += 1;
    fields.insert("id".to_string(), json!(id));
    fields.entry("created_at").or_insert_with(|| json!(timestamp()));
    for key in fields.keys() {
        if !table_data.columns.contains(key) {
            table_data.columns.push(key.clone());
        }
    }
    table_data.rows.insert(id, fields);
    backend.log_database(format!("{table}: record {id} created"));
    Ok(Json(json!({ "success": true, "message": "record created", "record_id": id })))
}

pub async fn update_record(
    State(db): State<Db>,
    Path((table, record_id)): Path<(String, i64)>,
    Json(fields): Json<Map<String, Value>>,
) -> ApiResult<Json<Value>> {
    let mut backend = db.write().await;
    let table_data = backend.tables.get_mut(&table).ok_or_else(invalid_table)?;
    let row = table_data
        .rows
        .get_mut(&record_id)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "record not found"))?;
    for (key, value) in fields {
        if key != "id" {
            row.insert(key, value);
        }
    }
    backend.log_database(format!("{table}: record {record_id} updated"));
    Ok(Json(json!({ "success": true, "message": "record updated" })))
}

pub async fn delete_record(
    State(db): State<Db>,
    Path((table, record_id)): Path<(String, i64)>,
) -> ApiResult<Json<Value>> {
    let mut backend = db.write().await;
    let table_data = backend.tables.get_mut(&table).ok_or_else(invalid_table)?;
    table_data
        .rows
        .remove(&record_id)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "record not found"))?;
    backend.log_database(format!("{table}: record {record_id} deleted"));
    Ok(Json(json!({ "success": true, "message": "record deleted" })))
}

pub async fn init(State(db): State<Db>) -> Json<Value> {
    let mut backend = db.write().await;
    backend.ensure_default_tables();
    backend.log_database("sqlite initialized");
    Json(json!({ "success": true, "message": "database initialized" }))
}
