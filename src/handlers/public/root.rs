// handlers/public/root.rs - GET / handler

use axum::response::Json;
use serde_json::{json, Value};

/// GET / - service name, version and route overview
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Starter API",
            "version": version,
            "description": "Items and users API backed by an external identity provider",
            "endpoints": {
                "health": "/health (public)",
                "users": "/api/users[/me|/:id] (protected)",
                "items": "/api/items[/:id] (protected)",
            }
        }
    }))
}
