// src/handlers/health.rs
// DOCUMENTATION: Health check handler
// PURPOSE: Simple endpoint to verify service status

use crate::services::MemoryCache;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use std::sync::Arc;

pub async fn health_check(cache: web::Data<Arc<MemoryCache>>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "places-cache-proxy",
        "version": env!("CARGO_PKG_VERSION"),
        "cache": cache.stats().await,
        "checked_at": chrono::Utc::now().to_rfc3339()
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
