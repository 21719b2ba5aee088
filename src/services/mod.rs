// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod cache;
pub mod location;
pub mod places_client;
pub mod proxy_service;

pub use cache::*;
pub use location::*;
pub use places_client::*;
pub use proxy_service::*;
