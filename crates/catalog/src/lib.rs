//! # Catalog Crate
//!
//! Users, films and marks for the film recommendation service.
//!
//! ## Main Components
//!
//! - **types**: Domain records (User, Film, FilmMark) and the `CatalogIndex`
//! - **parser**: Parse `::`-separated .dat files into records
//! - **index**: Loading, aggregate ratings, validation and search
//! - **store**: `RatingStore` / `FilmCatalog` traits consumed by the engine
//! - **error**: Error types for loading and indexing
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{CatalogIndex, RatingStore};
//! use std::path::Path;
//!
//! let index = CatalogIndex::load_from_dir(Path::new("data"))?;
//! let snapshot = index.find_user_id_film_marks()?;
//! println!("{} users in snapshot", snapshot.len());
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;
pub mod store;

pub use error::{CatalogError, Result};
pub use store::{FilmCatalog, RatingStore};
pub use types::{
    // Type aliases
    UserId,
    FilmId,
    RatingSnapshot,
    // Core types
    User,
    Film,
    FilmMark,
    CatalogIndex,
    // Enums
    Genre,
    Mpa,
};
