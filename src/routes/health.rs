use axum::{extract::State, Json};
use redb::{ReadableDatabase, ReadableTableMetadata};
use serde_json::{json, Value};

use crate::db::tables;
use crate::AppState;

/// Health check endpoint
///
/// Reports store connectivity and how many recipes it holds.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db = state.db.clone();
    let lookup = tokio::task::spawn_blocking(move || -> Result<u64, String> {
        let read_txn = db.begin_read().map_err(|e| e.to_string())?;
        let recipes = read_txn
            .open_table(tables::RECIPES)
            .map_err(|e| e.to_string())?;
        recipes.len().map_err(|e| e.to_string())
    })
    .await
    .unwrap_or_else(|e| Err(e.to_string()));

    let (status, database, recipes) = match lookup {
        Ok(count) => ("healthy", "connected", Some(count)),
        Err(e) => {
            tracing::error!("Database health check failed: {}", e);
            ("unhealthy", "disconnected", None)
        }
    };

    Json(json!({
        "status": status,
        "database": database,
        "recipes": recipes,
        "environment": state.config.environment,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
