// src/handlers/places.rs
// DOCUMENTATION: HTTP handler for the nearby search proxy
// PURPOSE: Read form parameters, call the orchestrator, write the response

use crate::errors::ProxyError;
use crate::models::NearbyParams;
use crate::services::PlacesProxy;
use actix_web::{http::header, web, HttpResponse};

/// ANY /
/// Nearby places around `location`, served from cache when possible
///
/// DOCUMENTATION: Parameters come from the query string and from a
/// form-encoded body; body values win when both are present, and the first
/// value wins when a key is repeated
pub async fn nearby_places(
    proxy: web::Data<PlacesProxy>,
    query: Option<web::Query<Vec<(String, String)>>>,
    form: Option<web::Form<Vec<(String, String)>>>,
) -> Result<HttpResponse, ProxyError> {
    let query = query
        .map(|q| NearbyParams::from_pairs(q.into_inner()))
        .unwrap_or_default();
    let params = match form {
        Some(form) => query.overridden_by(NearbyParams::from_pairs(form.into_inner())),
        None => query,
    };

    let served = proxy.serve(params.location(), params.radius()).await?;

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "application/json; charset=utf-8"))
        .insert_header(("X-Cache", served.cache_status.as_str()))
        .body(served.body))
}

/// Configuration for the proxy route
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::route().to(nearby_places));
}
