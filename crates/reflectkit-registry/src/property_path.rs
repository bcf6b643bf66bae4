//! Property path parsing.
//!
//! A property path routes to a (possibly nested) property on an object
//! graph: dot-separated property names with optional bracketed collection
//! keys, e.g. `transform.position[0]` or `settings["display"].width`.

use reflectkit_core::CollectionKey;

/// One step of a parsed property path.
#[derive(Clone, Debug, PartialEq)]
pub enum PathSegment {
    /// A named property on the current definition.
    Property(String),
    /// A keyed element of the current collection value.
    Element(CollectionKey),
}

/// Parse a path into segments.
///
/// Returns `None` on syntax errors (empty path, empty names, unbalanced
/// or empty brackets, stray separators) - binding treats that the same as
/// a property that does not exist.
pub fn parse_path(path: &str) -> Option<Vec<PathSegment>> {
    if path.is_empty() {
        return None;
    }

    let mut segments = Vec::new();
    let mut rest = path;
    let mut expect_name = true;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('.') {
            if expect_name || after.is_empty() {
                return None;
            }
            rest = after;
            expect_name = true;
            continue;
        }

        if let Some(after) = rest.strip_prefix('[') {
            if expect_name {
                // An element access can only follow a completed segment.
                return None;
            }
            let close = after.find(']')?;
            let key = CollectionKey::parse(&after[..close])?;
            segments.push(PathSegment::Element(key));
            rest = &after[close + 1..];
            expect_name = false;
            continue;
        }

        if !expect_name {
            // A name directly after a bracket, e.g. `a[0]b`.
            return None;
        }
        let end = rest
            .find(['.', '['])
            .unwrap_or(rest.len());
        let name = &rest[..end];
        if name.is_empty() {
            return None;
        }
        segments.push(PathSegment::Property(name.to_string()));
        rest = &rest[end..];
        expect_name = false;
    }

    if expect_name {
        // Trailing separator.
        return None;
    }
    Some(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_name() {
        assert_eq!(
            parse_path("count"),
            Some(vec![PathSegment::Property("count".to_string())])
        );
    }

    #[test]
    fn dotted_path() {
        assert_eq!(
            parse_path("transform.position"),
            Some(vec![
                PathSegment::Property("transform".to_string()),
                PathSegment::Property("position".to_string()),
            ])
        );
    }

    #[test]
    fn indexed_path() {
        assert_eq!(
            parse_path("items[2]"),
            Some(vec![
                PathSegment::Property("items".to_string()),
                PathSegment::Element(CollectionKey::Index(2)),
            ])
        );
    }

    #[test]
    fn string_key_and_nested_access() {
        assert_eq!(
            parse_path("settings[\"display\"].width"),
            Some(vec![
                PathSegment::Property("settings".to_string()),
                PathSegment::Element(CollectionKey::Key("display".to_string())),
                PathSegment::Property("width".to_string()),
            ])
        );
    }

    #[test]
    fn chained_elements() {
        assert_eq!(
            parse_path("grid[1][2]"),
            Some(vec![
                PathSegment::Property("grid".to_string()),
                PathSegment::Element(CollectionKey::Index(1)),
                PathSegment::Element(CollectionKey::Index(2)),
            ])
        );
    }

    #[test]
    fn malformed_paths_are_rejected() {
        for path in ["", ".", "a.", ".a", "a..b", "[0]", "a.[0]", "a[", "a[]", "a[0]b", "a[0"] {
            assert_eq!(parse_path(path), None, "path {path:?} should be rejected");
        }
    }
}
