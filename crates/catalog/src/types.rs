//! Core domain types for the film catalog.
//!
//! This module defines the records that flow between the catalog and the
//! recommendation engine, plus the in-memory `CatalogIndex` that owns them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a film
pub type FilmId = u32;

/// Every known user's marks, keyed by user id.
///
/// Users without any marks are present with an empty set.
pub type RatingSnapshot = HashMap<UserId, HashSet<FilmMark>>;

// =============================================================================
// User-related Types
// =============================================================================

/// A registered user of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub login: String,
    pub name: String,
}

// =============================================================================
// Film-related Types
// =============================================================================

/// A film together with its aggregate rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Film {
    pub id: FilmId,
    pub title: String,
    /// Year extracted from the title, e.g. "Heat (1995)"
    pub year: Option<u16>,
    pub genres: Vec<Genre>,
    pub mpa: Mpa,
    /// Mean score over every mark for this film, 0.0 when unrated
    pub rating: f32,
    pub mark_count: u32,
}

impl Film {
    /// Create an unrated film.
    pub fn new(id: FilmId, title: impl Into<String>, genres: Vec<Genre>, mpa: Mpa) -> Self {
        let title = title.into();
        Self {
            id,
            year: crate::parser::extract_year_from_title(&title),
            title,
            genres,
            mpa,
            rating: 0.0,
            mark_count: 0,
        }
    }
}

/// Film genres known to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Genre {
    Comedy,
    Drama,
    Cartoon,
    Thriller,
    Documentary,
    Action,
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Genre::Comedy => "Comedy",
            Genre::Drama => "Drama",
            Genre::Cartoon => "Cartoon",
            Genre::Thriller => "Thriller",
            Genre::Documentary => "Documentary",
            Genre::Action => "Action",
        };
        f.write_str(name)
    }
}

/// Motion Picture Association rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mpa {
    G,
    PG,
    PG13,
    R,
    NC17,
}

impl fmt::Display for Mpa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mpa::G => "G",
            Mpa::PG => "PG",
            Mpa::PG13 => "PG-13",
            Mpa::R => "R",
            Mpa::NC17 => "NC-17",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Mark Type
// =============================================================================

/// A user's score for a single film.
///
/// Two marks are equal when they share `(user_id, film_id)`, whatever their
/// scores, so a `HashSet<FilmMark>` holds at most one mark per film.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FilmMark {
    pub user_id: UserId,
    pub film_id: FilmId,
    pub score: i32,
}

impl FilmMark {
    pub fn new(user_id: UserId, film_id: FilmId, score: i32) -> Self {
        Self {
            user_id,
            film_id,
            score,
        }
    }
}

impl PartialEq for FilmMark {
    fn eq(&self, other: &Self) -> bool {
        self.user_id == other.user_id && self.film_id == other.film_id
    }
}

impl Eq for FilmMark {}

impl Hash for FilmMark {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.user_id.hash(state);
        self.film_id.hash(state);
    }
}

// =============================================================================
// CatalogIndex - The In-Memory Store
// =============================================================================

/// Holds users, films and marks with the lookups the service needs.
///
/// Marks are kept twice: per user for snapshots, per film for aggregate
/// ratings. Films live in a `BTreeMap` so id-ordered scans are cheap.
#[derive(Debug)]
pub struct CatalogIndex {
    pub(crate) users: HashMap<UserId, User>,
    pub(crate) films: BTreeMap<FilmId, Film>,

    /// All marks made by each user
    pub(crate) user_marks: HashMap<UserId, Vec<FilmMark>>,
    /// All marks received by each film
    pub(crate) film_marks: HashMap<FilmId, Vec<FilmMark>>,
}

impl CatalogIndex {
    /// Creates a new, empty CatalogIndex
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
            films: BTreeMap::new(),
            user_marks: HashMap::new(),
            film_marks: HashMap::new(),
        }
    }

    /// Get a user by ID
    pub fn get_user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Get a film by ID
    pub fn get_film(&self, id: FilmId) -> Option<&Film> {
        self.films.get(&id)
    }

    /// Get all marks made by a user, empty if the user has none
    pub fn get_user_marks(&self, user_id: UserId) -> &[FilmMark] {
        self.user_marks
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get all marks for a film
    pub fn get_film_marks(&self, film_id: FilmId) -> &[FilmMark] {
        self.film_marks
            .get(&film_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All user ids, ascending
    pub fn all_user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.users.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// All film ids, ascending
    pub fn all_film_ids(&self) -> Vec<FilmId> {
        self.films.keys().copied().collect()
    }

    /// Insert a user into the index
    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Insert a film into the index
    pub fn insert_film(&mut self, film: Film) {
        self.films.insert(film.id, film);
    }

    /// Insert a mark and update both mark indices.
    ///
    /// Aggregate ratings are not touched; call
    /// [`compute_film_ratings`](Self::compute_film_ratings) once loading is done.
    pub fn insert_mark(&mut self, mark: FilmMark) -> crate::Result<()> {
        let marks = self.user_marks.entry(mark.user_id).or_default();
        if marks.iter().any(|m| m.film_id == mark.film_id) {
            return Err(crate::CatalogError::DuplicateMark {
                user_id: mark.user_id,
                film_id: mark.film_id,
            });
        }
        marks.push(mark);

        self.film_marks.entry(mark.film_id).or_default().push(mark);
        Ok(())
    }

    /// Get counts for debugging/validation: (users, films, marks)
    pub fn counts(&self) -> (usize, usize, usize) {
        let total_marks = self.user_marks.values().map(|v| v.len()).sum();
        (self.users.len(), self.films.len(), total_marks)
    }
}

impl Default for CatalogIndex {
    fn default() -> Self {
        Self::new()
    }
}
