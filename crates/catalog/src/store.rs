//! Collaborator traits consumed by the recommendation engine.
//!
//! The engine never touches storage directly: it asks a `RatingStore` for a
//! snapshot of every user's marks and a `FilmCatalog` for rated film records.
//! `CatalogIndex` implements both for the in-memory catalog.

use crate::error::Result;
use crate::types::{CatalogIndex, Film, FilmId, RatingSnapshot};
use std::collections::{BTreeSet, HashSet};

/// Source of rating snapshots.
///
/// ## Design Note
/// - `Send + Sync` so one store can serve concurrent requests
/// - Each call returns an owned snapshot; callers never observe later writes
pub trait RatingStore: Send + Sync {
    /// Every known user's marks, users without marks mapping to an empty set.
    fn find_user_id_film_marks(&self) -> Result<RatingSnapshot>;
}

/// Resolves film ids to film records carrying their aggregate rating.
pub trait FilmCatalog: Send + Sync {
    /// Films for the given ids, in ascending id order.
    ///
    /// Ids with no film behind them are skipped.
    fn find_films_by_ids(&self, ids: &BTreeSet<FilmId>) -> Result<Vec<Film>>;
}

impl RatingStore for CatalogIndex {
    fn find_user_id_film_marks(&self) -> Result<RatingSnapshot> {
        let mut snapshot: RatingSnapshot = self
            .users
            .keys()
            .map(|&user_id| (user_id, HashSet::new()))
            .collect();

        for (&user_id, marks) in &self.user_marks {
            snapshot
                .entry(user_id)
                .or_default()
                .extend(marks.iter().copied());
        }
        Ok(snapshot)
    }
}

impl FilmCatalog for CatalogIndex {
    fn find_films_by_ids(&self, ids: &BTreeSet<FilmId>) -> Result<Vec<Film>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.get_film(*id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FilmMark, Genre, Mpa, User};

    fn create_test_index() -> CatalogIndex {
        let mut index = CatalogIndex::new();
        for id in 1..=3 {
            index.insert_user(User {
                id,
                login: format!("user{id}"),
                name: format!("User {id}"),
            });
        }
        for id in 1..=3 {
            index.insert_film(Film::new(id, format!("Film {id}"), vec![Genre::Drama], Mpa::G));
        }
        index.insert_mark(FilmMark::new(1, 1, 8)).unwrap();
        index.insert_mark(FilmMark::new(1, 2, 6)).unwrap();
        index.insert_mark(FilmMark::new(2, 1, 4)).unwrap();
        index.compute_film_ratings();
        index
    }

    #[test]
    fn test_snapshot_includes_users_without_marks() {
        let index = create_test_index();
        let snapshot = index.find_user_id_film_marks().unwrap();

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[&1].len(), 2);
        assert_eq!(snapshot[&2].len(), 1);
        assert!(snapshot[&3].is_empty());
    }

    #[test]
    fn test_find_films_skips_missing_ids() {
        let index = create_test_index();
        let ids: BTreeSet<FilmId> = [3, 1, 99].into_iter().collect();

        let films = index.find_films_by_ids(&ids).unwrap();
        let found: Vec<FilmId> = films.iter().map(|f| f.id).collect();
        assert_eq!(found, vec![1, 3]);
        assert_eq!(films[0].rating, 6.0);
    }
}
