//! Documentation tag parsing (spec.md §4.G "Route documentation").
//!
//! Rust doc comments aren't available to running code, so routes pass their
//! doc comment text in explicitly and this module parses the `@Tag value`
//! lines out of it, the same way route registration already takes its
//! pattern as an explicit `&str` argument rather than inspecting source.
use std::collections::HashMap;

/// Parsed `@`-tag metadata from a route's doc comment text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteDocs {
    pub id: Option<String>,
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub status_codes: Vec<(u16, String)>,
    pub deprecated: bool,
    pub errors: Vec<String>,
}

impl RouteDocs {
    /// Parse `@ID`, `@Tag`, `@Summary`, `@Description`, `@StatusCode`,
    /// `@Deprecated` and `@Error` lines out of `text`. Unrecognized lines
    /// are appended to the description, so free-form prose before the tags
    /// still comes through.
    pub fn parse(text: &str) -> Self {
        let mut docs = RouteDocs::default();
        let mut description_lines = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(rest) = line.strip_prefix("@ID") {
                docs.id = Some(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix("@Tag") {
                docs.tags.push(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix("@Summary") {
                docs.summary = Some(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix("@Description") {
                description_lines.push(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix("@StatusCode") {
                if let Some((code, message)) = rest.trim().split_once(' ') {
                    if let Ok(code) = code.parse::<u16>() {
                        docs.status_codes.push((code, message.trim().to_string()));
                    }
                }
            } else if line.strip_prefix("@Deprecated").is_some() {
                docs.deprecated = true;
            } else if let Some(rest) = line.strip_prefix("@Error") {
                docs.errors.push(rest.trim().to_string());
            } else {
                description_lines.push(line.to_string());
            }
        }
        if !description_lines.is_empty() {
            let joined = description_lines.join(" ");
            docs.description = Some(match docs.description.take() {
                Some(existing) => format!("{} {}", existing, joined),
                None => joined,
            });
        }
        docs
    }
}

/// Group parsed route docs by their `@Tag` value, for a document generator
/// that wants to section routes by tag. Routes with no tag land under `""`.
pub fn group_by_tag(docs: &[RouteDocs]) -> HashMap<String, Vec<&RouteDocs>> {
    let mut groups: HashMap<String, Vec<&RouteDocs>> = HashMap::new();
    for doc in docs {
        if doc.tags.is_empty() {
            groups.entry(String::new()).or_default().push(doc);
        } else {
            for tag in &doc.tags {
                groups.entry(tag.clone()).or_default().push(doc);
            }
        }
    }
    groups
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parses_all_tags() {
        let text = "\
            @ID getUser\n\
            @Tag users\n\
            @Summary Fetch a user by id\n\
            @Description Looks the user up by their numeric id.\n\
            @StatusCode 404 user not found\n\
            @Deprecated\n\
            @Error NotFound\n\
        ";
        let docs = RouteDocs::parse(text);
        assert_eq!(docs.id.as_deref(), Some("getUser"));
        assert_eq!(docs.tags, vec!["users".to_string()]);
        assert_eq!(docs.summary.as_deref(), Some("Fetch a user by id"));
        assert_eq!(docs.description.as_deref(), Some("Looks the user up by their numeric id."));
        assert_eq!(docs.status_codes, vec![(404, "user not found".to_string())]);
        assert!(docs.deprecated);
        assert_eq!(docs.errors, vec!["NotFound".to_string()]);
    }

    #[test]
    fn test_untagged_lines_become_description() {
        let docs = RouteDocs::parse("Just a plain summary with no tags.");
        assert_eq!(docs.description.as_deref(), Some("Just a plain summary with no tags."));
        assert!(docs.id.is_none());
    }

    #[test]
    fn test_group_by_tag() {
        let mut a = RouteDocs::default();
        a.tags = vec!["users".to_string()];
        let mut b = RouteDocs::default();
        b.tags = vec!["users".to_string(), "admin".to_string()];
        let groups = group_by_tag(&[a, b]);
        assert_eq!(groups.get("users").unwrap().len(), 2);
        assert_eq!(groups.get("admin").unwrap().len(), 1);
    }
}
