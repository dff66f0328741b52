//! Loading of the CSV snapshots the seed binary feeds to the importer.
//!
//! The snapshots are plain comma-separated files with a header row; fields
//! may be double-quoted, with `""` escaping a quote inside a quoted field.

use std::{fs, path::Path};

use crate::{
    error::DataError,
    models::{MovieRecord, RatingRecord, UserRecord},
};

pub fn load_users(path: &Path) -> Result<Vec<UserRecord>, DataError> {
    parse_users(&read_file(path)?, path)
}

pub fn load_movies(path: &Path) -> Result<Vec<MovieRecord>, DataError> {
    parse_movies(&read_file(path)?, path)
}

pub fn load_ratings(path: &Path) -> Result<Vec<RatingRecord>, DataError> {
    parse_ratings(&read_file(path)?, path)
}

fn read_file(path: &Path) -> Result<String, DataError> {
    fs::read_to_string(path)
        .map_err(|source| DataError::Dataset { path: path.to_path_buf(), source })
}

fn parse_users(text: &str, path: &Path) -> Result<Vec<UserRecord>, DataError> {
    let mut out = Vec::new();
    for (line_no, line) in data_rows(text) {
        let fields = split_row(line);
        let [handle, display_name, secret, country, birth_date] = fields.as_slice() else {
            return Err(malformed(path, line_no, format!("expected 5 fields, got {}", fields.len())));
        };
        birth_date
            .parse::<jiff::civil::Date>()
            .map_err(|err| malformed(path, line_no, format!("bad birth date: {err}")))?;
        out.push(UserRecord {
            handle: handle.clone(),
            display_name: display_name.clone(),
            secret: secret.clone(),
            country: country.clone(),
            birth_date: birth_date.clone(),
        });
    }
    Ok(out)
}

fn parse_movies(text: &str, path: &Path) -> Result<Vec<MovieRecord>, DataError> {
    let mut out = Vec::new();
    for (line_no, line) in data_rows(text) {
        let fields = split_row(line);
        let [title, genre, release_year] = fields.as_slice() else {
            return Err(malformed(path, line_no, format!("expected 3 fields, got {}", fields.len())));
        };
        let release_year = release_year
            .parse::<i32>()
            .map_err(|err| malformed(path, line_no, format!("bad release year: {err}")))?;
        out.push(MovieRecord { title: title.clone(), genre: genre.clone(), release_year });
    }
    Ok(out)
}

fn parse_ratings(text: &str, path: &Path) -> Result<Vec<RatingRecord>, DataError> {
    let mut out = Vec::new();
    for (line_no, line) in data_rows(text) {
        let fields = split_row(line);
        let [handle, title, score] = fields.as_slice() else {
            return Err(malformed(path, line_no, format!("expected 3 fields, got {}", fields.len())));
        };
        let score = score
            .parse::<f64>()
            .map_err(|err| malformed(path, line_no, format!("bad score: {err}")))?;
        out.push(RatingRecord { handle: handle.clone(), title: title.clone(), score });
    }
    Ok(out)
}

/// Data lines with their 1-based line numbers; the header row and blank
/// lines are skipped.
fn data_rows(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .skip(1)
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
}

fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
            },
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn malformed(path: &Path, line: usize, reason: String) -> DataError {
    DataError::Malformed { path: path.to_path_buf(), line, reason }
}
