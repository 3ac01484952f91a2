//! Integration tests for loading a catalog directory from disk.

use catalog::{CatalogError, CatalogIndex, FilmCatalog, Genre, Mpa, RatingStore};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

fn write_dataset(name: &str, users: &str, films: &str, marks: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("catalog-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("users.dat"), users).unwrap();
    fs::write(dir.join("films.dat"), films).unwrap();
    fs::write(dir.join("marks.dat"), marks).unwrap();
    dir
}

#[test]
fn test_load_complete_dataset() {
    let dir = write_dataset(
        "complete",
        "1::ann::Ann\n2::bob::Bob\n3::cid::Cid\n",
        "1::Heat (1995)::Action|Thriller::R\n\
         2::Up (2009)::Cartoon::PG\n\
         3::Shoah (1985)::::G\n",
        "1::1::8\n1::2::6\n2::1::10\n2::3::-2\n",
    );

    let index = CatalogIndex::load_from_dir(&dir).unwrap();
    assert_eq!(index.counts(), (3, 3, 4));

    let heat = index.get_film(1).unwrap();
    assert_eq!(heat.genres, vec![Genre::Action, Genre::Thriller]);
    assert_eq!(heat.mpa, Mpa::R);
    assert!((heat.rating - 9.0).abs() < f32::EPSILON);
    assert!(index.get_film(3).unwrap().genres.is_empty());

    let snapshot = index.find_user_id_film_marks().unwrap();
    assert_eq!(snapshot.len(), 3);
    assert!(snapshot[&3].is_empty());

    let ids: BTreeSet<u32> = [3, 2].into_iter().collect();
    let films = index.find_films_by_ids(&ids).unwrap();
    assert_eq!(films[0].id, 2);
    assert_eq!(films[1].rating, -2.0);
}

#[test]
fn test_load_rejects_dangling_mark() {
    let dir = write_dataset(
        "dangling",
        "1::ann::Ann\n",
        "1::Heat (1995)::Action::R\n",
        "1::1::8\n1::7::5\n",
    );

    let err = CatalogIndex::load_from_dir(&dir).unwrap_err();
    assert!(matches!(err, CatalogError::MissingReference { id: 7, .. }));
}

#[test]
fn test_load_rejects_duplicate_mark() {
    let dir = write_dataset(
        "duplicate",
        "1::ann::Ann\n",
        "1::Heat (1995)::Action::R\n",
        "1::1::8\n1::1::5\n",
    );

    let err = CatalogIndex::load_from_dir(&dir).unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateMark { .. }));
}

#[test]
fn test_load_missing_directory() {
    let err = CatalogIndex::load_from_dir(std::path::Path::new("/no/such/catalog")).unwrap_err();
    assert!(matches!(err, CatalogError::FileNotFound { .. }));
}
