//! Parser for the catalog data files.
//!
//! All files are `::`-separated, one record per line:
//! - users.dat: userId::login::name
//! - films.dat: filmId::title::genres::mpa
//! - marks.dat: userId::filmId::score

use crate::error::{CatalogError, Result};
use crate::types::*;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Read a file as ISO-8859-1 (Latin-1), splitting into lines.
///
/// Every byte maps directly to a Unicode code point, so this never fails on
/// non-UTF-8 input exported from older tools.
fn read_lines_latin1(path: &Path) -> Result<Vec<String>> {
    let mut file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CatalogError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => CatalogError::IoError(e),
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let content: String = bytes.iter().map(|&b| b as char).collect();

    Ok(content.lines().map(|s| s.to_string()).collect())
}

/// Iterate the non-empty lines of a file with their 1-based line numbers.
fn records(lines: &[String]) -> impl Iterator<Item = (usize, &str)> {
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

fn next_field<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    file: &str,
    line: usize,
    name: &str,
) -> Result<&'a str> {
    parts.next().ok_or_else(|| CatalogError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Missing {}", name),
    })
}

fn parse_number<T>(value: &str, file: &str, line: usize, name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| CatalogError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Invalid {}: {}", name, e),
    })
}

/// Parse the users.dat file
pub fn parse_users(path: &Path) -> Result<Vec<User>> {
    const FILE: &str = "users.dat";
    let lines = read_lines_latin1(path)?;
    let mut users = Vec::new();

    for (line_no, line) in records(&lines) {
        let mut parts = line.split("::");

        let user_id = next_field(&mut parts, FILE, line_no, "userId")?;
        let login = next_field(&mut parts, FILE, line_no, "login")?;
        let name = next_field(&mut parts, FILE, line_no, "name")?;

        users.push(User {
            id: parse_number(user_id, FILE, line_no, "userId")?,
            login: login.to_string(),
            name: name.to_string(),
        });
    }

    Ok(users)
}

/// Parse the films.dat file
///
/// Genres are pipe-separated ("Comedy|Drama") and may be empty.
pub fn parse_films(path: &Path) -> Result<Vec<Film>> {
    const FILE: &str = "films.dat";
    let lines = read_lines_latin1(path)?;
    let mut films = Vec::new();

    for (line_no, line) in records(&lines) {
        let mut parts = line.split("::");

        let film_id = next_field(&mut parts, FILE, line_no, "filmId")?;
        let title = next_field(&mut parts, FILE, line_no, "title")?;
        let genres = next_field(&mut parts, FILE, line_no, "genres")?;
        let mpa = next_field(&mut parts, FILE, line_no, "mpa")?;

        films.push(Film::new(
            parse_number(film_id, FILE, line_no, "filmId")?,
            title,
            parse_genres(genres)?,
            parse_mpa(mpa)?,
        ));
    }
    Ok(films)
}

/// Parse the marks.dat file
///
/// Scores are signed integers; no range is enforced here.
pub fn parse_marks(path: &Path) -> Result<Vec<FilmMark>> {
    const FILE: &str = "marks.dat";
    let lines = read_lines_latin1(path)?;
    let mut marks = Vec::new();

    for (line_no, line) in records(&lines) {
        let mut parts = line.split("::");

        let user_id = next_field(&mut parts, FILE, line_no, "userId")?;
        let film_id = next_field(&mut parts, FILE, line_no, "filmId")?;
        let score = next_field(&mut parts, FILE, line_no, "score")?;

        marks.push(FilmMark {
            user_id: parse_number(user_id, FILE, line_no, "userId")?,
            film_id: parse_number(film_id, FILE, line_no, "filmId")?,
            score: parse_number(score, FILE, line_no, "score")?,
        });
    }
    Ok(marks)
}

/// Extract year from film title
///
/// Example: "Heat (1995)" -> Some(1995)
///          "Film Title" -> None
pub(crate) fn extract_year_from_title(title: &str) -> Option<u16> {
    let start = title.rfind('(')?;
    let end = title.rfind(')')?;
    if start < end {
        return title[start + 1..end].parse::<u16>().ok();
    }
    None
}

/// Parse a genre name into the Genre enum
pub fn parse_genre(s: &str) -> Result<Genre> {
    match s {
        "Comedy" => Ok(Genre::Comedy),
        "Drama" => Ok(Genre::Drama),
        "Cartoon" => Ok(Genre::Cartoon),
        "Thriller" => Ok(Genre::Thriller),
        "Documentary" => Ok(Genre::Documentary),
        "Action" => Ok(Genre::Action),
        _ => Err(CatalogError::InvalidValue {
            field: "genre".to_string(),
            value: s.to_string(),
        }),
    }
}

/// Parse pipe-separated genres, deduplicating while keeping first-seen order
fn parse_genres(s: &str) -> Result<Vec<Genre>> {
    let mut genres = Vec::new();
    for genre_str in s.split('|').map(str::trim).filter(|g| !g.is_empty()) {
        let genre = parse_genre(genre_str)?;
        if !genres.contains(&genre) {
            genres.push(genre);
        }
    }
    Ok(genres)
}

/// Parse an MPA rating as written on posters ("PG-13")
pub fn parse_mpa(s: &str) -> Result<Mpa> {
    match s.trim() {
        "G" => Ok(Mpa::G),
        "PG" => Ok(Mpa::PG),
        "PG-13" => Ok(Mpa::PG13),
        "R" => Ok(Mpa::R),
        "NC-17" => Ok(Mpa::NC17),
        other => Err(CatalogError::InvalidValue {
            field: "mpa".to_string(),
            value: other.to_string(),
        }),
    }
}
