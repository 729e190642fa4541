//! Personalized recommendations for a home-services gig marketplace.
//!
//! The [`services::RecommenderEngine`] owns all state: an immutable
//! [`services::CatalogIndex`], user profiles and the interaction table. The
//! [`api`] module exposes it over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
