//! Response header lookup.

/// Returns the value of the last header named `name` (case-insensitive) among
/// raw header lines. Status lines and blank lines are skipped.
pub fn header_value(lines: &[String], name: &str) -> Option<String> {
    let mut found = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            if key.trim().eq_ignore_ascii_case(name) {
                found = Some(value.trim().to_string());
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_etag_case_insensitively() {
        let lines = [
            "HTTP/1.1 200 OK".to_string(),
            "etag: \"abc-123\"".to_string(),
            "Content-Length: 0".to_string(),
        ];
        assert_eq!(header_value(&lines, "ETag").as_deref(), Some("\"abc-123\""));
    }

    #[test]
    fn last_occurrence_wins() {
        // 100 Continue followed by the final response.
        let lines = [
            "HTTP/1.1 100 Continue".to_string(),
            "".to_string(),
            "HTTP/1.1 200 OK".to_string(),
            "ETag: first".to_string(),
            "ETag: second".to_string(),
        ];
        assert_eq!(header_value(&lines, "etag").as_deref(), Some("second"));
    }

    #[test]
    fn missing_header() {
        let lines = ["HTTP/1.1 200 OK".to_string()];
        assert!(header_value(&lines, "ETag").is_none());
    }
}
