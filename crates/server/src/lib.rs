//! Server crate for the film recommendation service.
//!
//! This crate contains the request-level service that ties the rating
//! store, the recommendation engine and the film catalog together.

pub mod service;

pub use service::{FilmRecommendation, RecommendationService};
