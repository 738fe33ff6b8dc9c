use std::{fs::read_to_string, path::Path};

use anyhow::Context;
use axum::http::HeaderMap;
use chrono::{Local, NaiveDate};

use crate::person::{Person, Persons};

/// Header names are case-insensitive on the wire; `HeaderName` wants lowercase.
pub const API_TOKEN_HEADER: &str = "api-token";

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn format(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// An empty configured token never authorizes anything.
pub fn is_authorized(headers: &HeaderMap, api_token: &str) -> bool {
    if api_token.is_empty() {
        return false;
    }

    headers
        .get(API_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|token| token == api_token)
}

/// Accepts a bare array or `{"persons": [...]}`.
pub fn parse_persons(raw: &str) -> serde_json::Result<Vec<Person>> {
    if raw.trim_start().starts_with('[') {
        serde_json::from_str(raw)
    } else {
        serde_json::from_str::<Persons>(raw).map(|seed| seed.persons)
    }
}

pub fn read_persons(path: &Path) -> anyhow::Result<Vec<Person>> {
    let raw =
        read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    parse_persons(&raw).with_context(|| format!("Invalid roster in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_format() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(format(date), "2026-01-05");
    }

    #[test]
    fn test_authorized() {
        let mut headers = HeaderMap::new();
        assert!(!is_authorized(&headers, "secret"));

        headers.insert(API_TOKEN_HEADER, HeaderValue::from_static("wrong"));
        assert!(!is_authorized(&headers, "secret"));

        headers.insert(API_TOKEN_HEADER, HeaderValue::from_static("secret"));
        assert!(is_authorized(&headers, "secret"));
    }

    #[test]
    fn test_empty_token_rejects() {
        let mut headers = HeaderMap::new();
        headers.insert(API_TOKEN_HEADER, HeaderValue::from_static(""));

        assert!(!is_authorized(&headers, ""));
    }

    #[test]
    fn test_parse_both_shapes() {
        let list = parse_persons(r#"[{"firstname":"Ada","lastname":"Lovelace"}]"#).unwrap();
        let wrapped =
            parse_persons(r#"{"persons":[{"firstname":"Alan","lastname":"Turing"}]}"#).unwrap();

        assert_eq!(list[0].lastname, "Lovelace");
        assert_eq!(wrapped[0].lastname, "Turing");
    }

    #[test]
    fn test_parse_garbage() {
        let error = parse_persons("not json").unwrap_err();
        assert!(error.is_syntax());
        assert_eq!(error.line(), 1);
    }

    #[test]
    fn test_read_error_keeps_location() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[\n  {{\"firstname\": 7}}\n]").unwrap();

        let error = read_persons(file.path()).unwrap_err();
        let message = format!("{error:#}");

        assert!(message.contains("Invalid roster in"), "{message}");
        assert!(message.contains("line 2"), "{message}");
    }

    #[test]
    fn test_read_persons_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"firstname":"Grace","lastname":"Hopper","type":"Admiral"}}]"#
        )
        .unwrap();

        let persons = read_persons(file.path()).unwrap();
        assert_eq!(persons.len(), 1);
        assert_eq!(persons[0].kind, "Admiral");
    }
}
