//! # Recommendation Service
//!
//! Serves one recommendation request end to end:
//! 1. Fetch a fresh rating snapshot from the store
//! 2. Run the engine on it (off the async runtime)
//! 3. Map the ranked films to response records
//!
//! Every call works on its own snapshot, so concurrent requests share
//! nothing but the read-only store and catalog.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use catalog::{Film, FilmCatalog, FilmId, RatingStore, UserId};
use recommender::RecommendationEngine;

/// Final recommendation returned to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilmRecommendation {
    /// 1-based position in the ranked list
    pub rank: usize,
    pub film_id: FilmId,
    pub title: String,
    pub year: Option<u16>,
    pub genres: Vec<String>,
    pub mpa: String,
    pub rating: f32,
}

impl FilmRecommendation {
    fn from_film(rank: usize, film: Film) -> Self {
        Self {
            rank,
            film_id: film.id,
            year: film.year,
            genres: film.genres.iter().map(|g| g.to_string()).collect(),
            mpa: film.mpa.to_string(),
            rating: film.rating,
            title: film.title,
        }
    }
}

/// Coordinates store, engine and catalog for each request
#[derive(Clone)]
pub struct RecommendationService {
    store: Arc<dyn RatingStore>,
    engine: RecommendationEngine,
}

impl RecommendationService {
    /// Create a service reading marks from `store` and films from `catalog`
    pub fn new(store: Arc<dyn RatingStore>, catalog: Arc<dyn FilmCatalog>) -> Self {
        Self {
            store,
            engine: RecommendationEngine::new(catalog),
        }
    }

    /// Main entry point: ranked recommendations for a user
    ///
    /// # Arguments
    /// * `user_id` - The user to recommend films for
    /// * `limit` - Maximum number of films to return
    ///
    /// # Returns
    /// Films sorted by aggregate rating (highest first). Unknown users get
    /// an empty list.
    pub async fn get_recommendations(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<FilmRecommendation>> {
        let start_time = Instant::now();

        let store = Arc::clone(&self.store);
        let engine = self.engine.clone().with_limit(limit);

        // Snapshot assembly and the overlap pass are CPU-bound
        let films = tokio::task::spawn_blocking(move || {
            let snapshot = store.find_user_id_film_marks()?;
            engine.recommend(user_id, &snapshot)
        })
        .await
        .context("Recommendation task panicked")?
        .context("Failed to compute recommendations")?;

        let recommendations: Vec<FilmRecommendation> = films
            .into_iter()
            .enumerate()
            .map(|(idx, film)| FilmRecommendation::from_film(idx + 1, film))
            .collect();

        info!(
            "Recommended {} films for user {} in {:.2?}",
            recommendations.len(),
            user_id,
            start_time.elapsed()
        );
        Ok(recommendations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{CatalogError, CatalogIndex, FilmMark, Genre, Mpa, RatingSnapshot, User};

    // ============================================================================
    // Test Fixtures
    // ============================================================================

    /// Three users; user 2 shares film 1 with user 1 and adds films 2 and 4
    fn build_test_index() -> Arc<CatalogIndex> {
        let mut index = CatalogIndex::new();

        index.insert_film(Film::new(
            1,
            "The Matrix (1999)",
            vec![Genre::Action, Genre::Thriller],
            Mpa::R,
        ));
        index.insert_film(Film::new(2, "Toy Story (1995)", vec![Genre::Cartoon, Genre::Comedy], Mpa::G));
        index.insert_film(Film::new(3, "Pulp Fiction (1994)", vec![Genre::Drama], Mpa::R));
        index.insert_film(Film::new(4, "Forrest Gump (1994)", vec![Genre::Drama], Mpa::PG13));

        for (id, login) in [(1, "neo"), (2, "trinity"), (3, "smith")] {
            index.insert_user(User {
                id,
                login: login.to_string(),
                name: login.to_uppercase(),
            });
        }

        for (user_id, film_id, score) in [(1, 1, 8), (1, 3, 7), (2, 1, 8), (2, 2, 5), (2, 4, 9)] {
            index
                .insert_mark(FilmMark::new(user_id, film_id, score))
                .expect("fixture marks are unique");
        }
        index.compute_film_ratings();

        Arc::new(index)
    }

    fn build_test_service() -> RecommendationService {
        let index = build_test_index();
        RecommendationService::new(index.clone(), index)
    }

    /// Store whose backing storage is unavailable
    struct UnavailableStore;

    impl RatingStore for UnavailableStore {
        fn find_user_id_film_marks(&self) -> catalog::Result<RatingSnapshot> {
            Err(CatalogError::IoError(std::io::Error::other("storage offline")))
        }
    }

    // ============================================================================
    // Tests
    // ============================================================================

    #[tokio::test]
    async fn test_recommendations_ranked_and_enriched() {
        let service = build_test_service();

        let recommendations = service.get_recommendations(1, 10).await.unwrap();

        assert_eq!(recommendations.len(), 2);
        let first = &recommendations[0];
        assert_eq!(first.rank, 1);
        assert_eq!(first.film_id, 4);
        assert_eq!(first.title, "Forrest Gump (1994)");
        assert_eq!(first.year, Some(1994));
        assert_eq!(first.genres, vec!["Drama".to_string()]);
        assert_eq!(first.mpa, "PG-13");
        assert_eq!(first.rating, 9.0);

        assert_eq!(recommendations[1].rank, 2);
        assert_eq!(recommendations[1].film_id, 2);
    }

    #[tokio::test]
    async fn test_limit_applied() {
        let service = build_test_service();

        let recommendations = service.get_recommendations(1, 1).await.unwrap();
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].film_id, 4);
    }

    #[tokio::test]
    async fn test_user_without_marks_gets_nothing() {
        let service = build_test_service();

        assert!(service.get_recommendations(3, 10).await.unwrap().is_empty());
        assert!(service.get_recommendations(999, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_requests_agree() {
        let service = build_test_service();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.get_recommendations(1, 10).await })
            })
            .collect();

        let expected = service.get_recommendations(1, 10).await.unwrap();
        for handle in handles {
            let recommendations = handle.await.unwrap().unwrap();
            assert_eq!(recommendations, expected);
        }
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let service = RecommendationService::new(Arc::new(UnavailableStore), build_test_index());

        let err = service.get_recommendations(1, 10).await.unwrap_err();
        assert!(format!("{err:#}").contains("storage offline"));
    }
}
