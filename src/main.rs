// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, cache, upstream client, and start HTTP server

mod config;
mod errors;
mod handlers;
mod models;
mod services;

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use config::Config;
use dotenv::dotenv;
use services::{start_cleanup_task, LocationNormalizer, MemoryCache, PlacesClient, PlacesProxy};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            config.log_level.as_str()
        } else {
            "info,actix_web=info"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Configuration error")?;

    log::info!("Starting places-cache-proxy...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize cache for nearby search responses
    let cache = Arc::new(MemoryCache::new());
    log::info!("Initialized nearby search cache (TTL: {}s)", config.cache_ttl_seconds);

    start_cleanup_task(cache.clone(), config.cache_cleanup_interval_seconds);
    log::info!(
        "Started cache cleanup task (interval: {}s)",
        config.cache_cleanup_interval_seconds
    );

    // 5. Wire the upstream client into the orchestrator
    let fetcher = Arc::new(PlacesClient::new(
        config.google_places_api_key.clone(),
        config.places_api_url.clone(),
    ));
    let proxy = PlacesProxy::new(
        LocationNormalizer::new(config.location_decimals),
        fetcher,
        cache.clone(),
        config.cache_ttl(),
        config.refresh_timeout(),
    );

    // 6. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(proxy.clone()))
            .app_data(web::Data::new(cache.clone()))
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Routes
            .configure(handlers::health_config)
            .configure(handlers::places_config)
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {}", server_addr))?
    .run()
    .await
    .context("HTTP server error")?;

    Ok(())
}
