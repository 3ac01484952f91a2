//! Overlap-based collaborative filtering.
//!
//! "Users who rated the same films as you also rated these films."
//!
//! ## Algorithm
//! 1. Collect the film ids the target user has marked
//! 2. For every other user (a peer), count the films both have marked
//! 3. Keep the novel films of the peers with the largest overlap:
//!    - a peer with strictly larger overlap replaces the candidates, but only
//!      if it marked at least one film the target hasn't
//!    - a peer tying the current (non-zero) best adds its novel films
//! 4. Resolve candidates through the `FilmCatalog`
//! 5. Order by aggregate rating, highest first, film id breaking ties

use catalog::{Film, FilmCatalog, FilmId, FilmMark, RatingSnapshot, Result, UserId};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Running state of the single pass over peers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct OverlapAccumulator {
    /// Largest overlap of any peer that had something new to offer
    pub(crate) max_overlap: usize,
    /// Novel films of every peer sitting at `max_overlap`
    pub(crate) recommendations: BTreeSet<FilmId>,
}

impl OverlapAccumulator {
    /// Fold one peer's marks into the accumulator.
    pub(crate) fn absorb(
        mut self,
        peer_marks: &HashSet<FilmMark>,
        target_films: &HashSet<FilmId>,
    ) -> Self {
        let overlap = peer_marks
            .iter()
            .filter(|mark| target_films.contains(&mark.film_id))
            .count();

        if overlap > self.max_overlap && overlap < peer_marks.len() {
            self.recommendations.clear();
            self.max_overlap = overlap;
            self.add_novel(peer_marks, target_films);
        } else if overlap == self.max_overlap && self.max_overlap > 0 {
            self.add_novel(peer_marks, target_films);
        }
        self
    }

    fn add_novel(&mut self, peer_marks: &HashSet<FilmMark>, target_films: &HashSet<FilmId>) {
        self.recommendations.extend(
            peer_marks
                .iter()
                .map(|mark| mark.film_id)
                .filter(|film_id| !target_films.contains(film_id)),
        );
    }
}

/// Recommends films from the peers whose marks overlap most with the target's.
#[derive(Clone)]
pub struct RecommendationEngine {
    /// Resolves candidate ids to rated film records
    catalog: Arc<dyn FilmCatalog>,

    /// Maximum number of films returned, unlimited when `None`
    limit: Option<usize>,
}

impl RecommendationEngine {
    /// Create an engine resolving films through `catalog`
    pub fn new(catalog: Arc<dyn FilmCatalog>) -> Self {
        Self {
            catalog,
            limit: None,
        }
    }

    /// Cap the number of returned films (default: unlimited)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Ranked recommendations for `target_user_id`.
    ///
    /// A user missing from the snapshot is treated as having no marks and
    /// gets an empty result. The only error source is the film catalog.
    #[instrument(skip(self, snapshot), fields(user_id = target_user_id))]
    pub fn recommend(
        &self,
        target_user_id: UserId,
        snapshot: &RatingSnapshot,
    ) -> Result<Vec<Film>> {
        let candidates = self.candidates(target_user_id, snapshot);
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let films = self.catalog.find_films_by_ids(&candidates)?;
        if films.len() < candidates.len() {
            debug!(
                "{} candidate films no longer in catalog",
                candidates.len() - films.len()
            );
        }

        Ok(self.rank(films, &candidates))
    }

    /// Same as [`recommend`](Self::recommend), film ids only.
    pub fn recommend_ids(
        &self,
        target_user_id: UserId,
        snapshot: &RatingSnapshot,
    ) -> Result<Vec<FilmId>> {
        Ok(self
            .recommend(target_user_id, snapshot)?
            .into_iter()
            .map(|film| film.id)
            .collect())
    }

    /// Unordered candidate film ids, before catalog resolution.
    pub fn candidates(
        &self,
        target_user_id: UserId,
        snapshot: &RatingSnapshot,
    ) -> BTreeSet<FilmId> {
        let target_films: HashSet<FilmId> = snapshot
            .get(&target_user_id)
            .map(|marks| marks.iter().map(|mark| mark.film_id).collect())
            .unwrap_or_default();

        // Visit peers in id order so debug output is reproducible
        let mut peers: Vec<(&UserId, &HashSet<FilmMark>)> = snapshot
            .iter()
            .filter(|(user_id, _)| **user_id != target_user_id)
            .collect();
        peers.sort_unstable_by_key(|(user_id, _)| **user_id);

        let peer_count = peers.len();
        let acc = peers
            .into_iter()
            .fold(OverlapAccumulator::default(), |acc, (_, marks)| {
                acc.absorb(marks, &target_films)
            });

        debug!(
            "Compared {} peers, max overlap {}, {} candidates",
            peer_count,
            acc.max_overlap,
            acc.recommendations.len()
        );
        acc.recommendations
    }

    /// Order resolved films by aggregate rating, highest first.
    fn rank(&self, mut films: Vec<Film>, candidates: &BTreeSet<FilmId>) -> Vec<Film> {
        films.retain(|film| candidates.contains(&film.id));
        films.sort_by(|a, b| {
            b.rating
                .total_cmp(&a.rating)
                .then_with(|| a.id.cmp(&b.id))
        });
        if let Some(limit) = self.limit {
            films.truncate(limit);
        }
        films
    }
}
