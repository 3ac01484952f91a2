//! # Recommender Crate
//!
//! Collaborative filtering over a snapshot of every user's film marks.
//!
//! The engine compares the target user with every peer, keeps the films of
//! the peers sharing the most marked films with the target, and ranks those
//! films by their aggregate rating.
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{CatalogIndex, RatingStore};
//! use recommender::RecommendationEngine;
//! use std::sync::Arc;
//!
//! let index = Arc::new(CatalogIndex::load_from_dir(Path::new("data"))?);
//! let engine = RecommendationEngine::new(index.clone()).with_limit(20);
//!
//! let snapshot = index.find_user_id_film_marks()?;
//! let films = engine.recommend(user_id, &snapshot)?;
//! ```
//!
//! ## Guarantees
//!
//! - No film the target already marked is ever returned
//! - Each film appears at most once
//! - Output order is total: rating descending, then film id ascending
//! - Unknown target users and single-user snapshots yield an empty result

pub mod engine;

pub use engine::RecommendationEngine;
