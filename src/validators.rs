//! Pure input validators.
//!
//! Each function either returns a typed value or exactly one
//! [`ApiError::Validation`]. None of them touch the filesystem, the network
//! or the environment.

use crate::{errors::ApiError, models::object_reference::ObjectReference};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn object_uri_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^s3://([a-z0-9.-]{3,63})/(.+)$").expect("valid regex"))
}

fn file_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z0-9_-]+)\.(tsv|csv|json)$").expect("valid regex"))
}

/// Parse `s3://container/key` into its two parts.
///
/// The container must be 3–63 characters of lowercase letters, digits, `.`
/// and `-`; the key is everything after the first `/` following the
/// container, taken verbatim.
pub fn parse_object_reference(raw: Option<&str>) -> Result<ObjectReference, ApiError> {
    let uri = match raw {
        Some(uri) if !uri.is_empty() => uri,
        _ => return Err(ApiError::validation("S3 URI is required")),
    };

    let captures = object_uri_regex()
        .captures(uri)
        .ok_or_else(|| ApiError::validation(format!("Invalid S3 URI: {uri}")))?;

    match (captures.get(1), captures.get(2)) {
        (Some(container), Some(key)) => Ok(ObjectReference::new(container.as_str(), key.as_str())),
        _ => Err(ApiError::validation(format!("Invalid S3 URI: {uri}"))),
    }
}

/// Check that `raw` is a bare `.tsv`, `.csv` or `.json` file name.
pub fn validate_file_name(raw: Option<&str>) -> Result<String, ApiError> {
    let name = match raw {
        Some(name) if !name.is_empty() => name,
        _ => return Err(ApiError::validation("Filename is required")),
    };

    if !file_name_regex().is_match(name) {
        return Err(ApiError::validation(format!("Invalid filename: {name}")));
    }

    Ok(name.to_string())
}

/// Extract the `content` string from a request body.
pub fn validate_content(payload: Option<&Value>) -> Result<String, ApiError> {
    let value = payload
        .and_then(Value::as_object)
        .and_then(|fields| fields.get("content"))
        .ok_or_else(|| ApiError::validation("Input content is required"))?;

    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ApiError::validation("Input content must be a string"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parts(raw: &str) -> (String, String) {
        let reference = parse_object_reference(Some(raw)).unwrap();
        (reference.container().to_string(), reference.key().to_string())
    }

    #[test]
    fn parses_nested_key() {
        assert_eq!(
            parts("s3://valid-bucket.name/some/nested/key"),
            ("valid-bucket.name".into(), "some/nested/key".into())
        );
    }

    #[test]
    fn key_is_taken_verbatim() {
        assert_eq!(
            parts("s3://abc/ spaced%20key/ "),
            ("abc".into(), " spaced%20key/ ".into())
        );
        assert_eq!(parts("s3://abc//leading"), ("abc".into(), "/leading".into()));
    }

    #[test]
    fn container_length_bounds() {
        let min = "a".repeat(3);
        let max = "b".repeat(63);
        assert_eq!(parts(&format!("s3://{min}/k")).0, min);
        assert_eq!(parts(&format!("s3://{max}/k")).0, max);

        for bad in ["s3://ab/key".to_string(), format!("s3://{}/k", "c".repeat(64))] {
            assert_eq!(
                parse_object_reference(Some(&bad)),
                Err(ApiError::validation(format!("Invalid S3 URI: {bad}")))
            );
        }
    }

    #[test]
    fn rejects_malformed_references() {
        let cases = [
            "s3://Upper/key",
            "s3://under_score/key",
            "s3://bucket",
            "s3://bucket/",
            "gs://bucket/key",
            "S3://bucket/key",
            " s3://bucket/key",
            "https://bucket/key",
            "bucket/key",
            "s3:/bucket/key",
        ];
        for raw in cases {
            let err = parse_object_reference(Some(raw)).unwrap_err();
            assert_eq!(err.kind(), crate::errors::ErrorKind::Validation, "{raw}");
        }
    }

    #[test]
    fn missing_reference_is_required() {
        let expected = Err(ApiError::validation("S3 URI is required"));
        assert_eq!(parse_object_reference(None), expected);
        assert_eq!(parse_object_reference(Some("")), expected);
    }

    #[test]
    fn reparsing_display_is_stable() {
        let first = parse_object_reference(Some("s3://my.bucket-1/a/b.csv")).unwrap();
        let second = parse_object_reference(Some(&first.to_string())).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn file_names() {
        for ok in ["report.csv", "data_2024-01.tsv", "x.json", "A-b_C.csv"] {
            assert_eq!(validate_file_name(Some(ok)).unwrap(), ok);
        }

        for bad in [
            "report.xlsx",
            "bad name.csv",
            "../escape.csv",
            "dir/report.csv",
            ".csv",
            "report.csv.bak",
            "report.CSV",
            "report",
        ] {
            assert_eq!(
                validate_file_name(Some(bad)),
                Err(ApiError::validation(format!("Invalid filename: {bad}"))),
                "{bad}"
            );
        }

        assert_eq!(
            validate_file_name(None),
            Err(ApiError::validation("Filename is required"))
        );
        assert_eq!(
            validate_file_name(Some("")),
            Err(ApiError::validation("Filename is required"))
        );
    }

    #[test]
    fn content_payloads() {
        assert_eq!(
            validate_content(Some(&json!({ "content": "hello" }))).unwrap(),
            "hello"
        );
        assert_eq!(
            validate_content(Some(&json!({ "content": "", "extra": 1 }))).unwrap(),
            ""
        );

        let required = Err(ApiError::validation("Input content is required"));
        assert_eq!(validate_content(None), required);
        assert_eq!(validate_content(Some(&json!({}))), required);
        assert_eq!(validate_content(Some(&json!({ "other": "x" }))), required);
        assert_eq!(validate_content(Some(&json!(["content"]))), required);
        assert_eq!(validate_content(Some(&Value::Null)), required);
    }

    #[test]
    fn content_must_be_a_string() {
        for value in [json!(42), json!(null), json!({ "nested": true }), json!(["a"])] {
            assert_eq!(
                validate_content(Some(&json!({ "content": value }))),
                Err(ApiError::validation("Input content must be a string"))
            );
        }
    }
}
