//! CatalogIndex building, aggregation and queries.
//!
//! Loads the three data files, fills the primary maps, computes the
//! aggregate rating of every film and checks referential integrity.

use crate::error::{CatalogError, Result};
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::path::Path;
use tracing::info;

impl CatalogIndex {
    /// Load the whole catalog from a directory.
    ///
    /// Expects `users.dat`, `films.dat` and `marks.dat` inside `data_dir`.
    /// The three files are parsed in parallel.
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        info!("Loading catalog from {}", data_dir.display());

        let users_path = data_dir.join("users.dat");
        let films_path = data_dir.join("films.dat");
        let marks_path = data_dir.join("marks.dat");

        let ((users, films), marks) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_users(&users_path),
                    || parser::parse_films(&films_path),
                )
            },
            || parser::parse_marks(&marks_path),
        );

        let users = users?;
        let films = films?;
        let marks = marks?;

        info!(
            "Parsed {} users, {} films, {} marks",
            users.len(),
            films.len(),
            marks.len()
        );

        let mut index = CatalogIndex::new();
        for user in users {
            index.insert_user(user);
        }
        for film in films {
            index.insert_film(film);
        }
        for mark in marks {
            index.insert_mark(mark)?;
        }

        index.compute_film_ratings();
        index.validate()?;

        Ok(index)
    }

    /// Recompute the aggregate rating and mark count of every film.
    ///
    /// The rating is the arithmetic mean of all scores; films nobody marked
    /// get 0.0.
    pub fn compute_film_ratings(&mut self) {
        let film_marks = &self.film_marks;
        self.films.par_iter_mut().for_each(|(film_id, film)| {
            let marks = film_marks.get(film_id).map(|v| v.as_slice()).unwrap_or(&[]);
            film.mark_count = marks.len() as u32;
            film.rating = if marks.is_empty() {
                0.0
            } else {
                let total: i64 = marks.iter().map(|m| m.score as i64).sum();
                total as f32 / marks.len() as f32
            };
        });
    }

    /// Validate data integrity.
    ///
    /// Every mark must reference an existing user and an existing film.
    pub fn validate(&self) -> Result<()> {
        for marks in self.user_marks.values() {
            for mark in marks {
                if !self.users.contains_key(&mark.user_id) {
                    return Err(CatalogError::MissingReference {
                        entity: "User".to_string(),
                        id: mark.user_id,
                    });
                }
                if !self.films.contains_key(&mark.film_id) {
                    return Err(CatalogError::MissingReference {
                        entity: "Film".to_string(),
                        id: mark.film_id,
                    });
                }
            }
        }
        Ok(())
    }

    /// Case-insensitive title search.
    ///
    /// Exact title matches come first, then substring matches; within each
    /// group films are ordered by aggregate rating, highest first.
    pub fn search_films(&self, title: &str) -> Vec<&Film> {
        let needle = title.to_lowercase();
        let mut matches: Vec<(u8, &Film)> = self
            .films
            .values()
            .filter_map(|film| {
                let haystack = film.title.to_lowercase();
                if haystack == needle {
                    Some((0, film))
                } else if haystack.contains(&needle) {
                    Some((1, film))
                } else {
                    None
                }
            })
            .collect();

        matches.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| b.1.rating.total_cmp(&a.1.rating))
        });
        matches.into_iter().map(|(_, film)| film).collect()
    }
}
