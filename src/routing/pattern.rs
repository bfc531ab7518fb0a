//! Path templates.
//!
//! # Responsibilities
//! - Parse a template such as `/feedback/:exerciseId` into tagged segments
//! - Match decoded path segments against the template, capturing parameters
//! - Rebuild a concrete path from parameter values
//! - Detect templates that could match the same concrete path
//!
//! # Design Decisions
//! - Parsed once at table construction; matching never re-parses strings
//! - Literal comparison is exact and case-sensitive
//! - A placeholder captures exactly one non-empty segment

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Captured parameters, keyed by placeholder name.
pub type Params = BTreeMap<String, String>;

/// One `/`-delimited piece of a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Must equal the input segment exactly.
    Literal(String),
    /// Captures any non-empty input segment under this name.
    Param(String),
}

impl Segment {
    fn accepts(&self, input: &str) -> bool {
        match self {
            Segment::Literal(text) => text == input,
            Segment::Param(_) => !input.is_empty(),
        }
    }

    /// Whether some concrete segment is accepted by both.
    fn overlaps(&self, other: &Segment) -> bool {
        match (self, other) {
            (Segment::Literal(a), Segment::Literal(b)) => a == b,
            _ => true,
        }
    }
}

/// Errors raised while parsing a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern {0:?} must start with '/'")]
    MissingLeadingSlash(String),

    #[error("pattern {0:?} contains an empty segment")]
    EmptySegment(String),

    #[error("pattern {0:?} contains a placeholder without a name")]
    UnnamedParam(String),

    #[error("placeholder {param:?} appears more than once in pattern {pattern:?}")]
    DuplicateParam { pattern: String, param: String },
}

/// A parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a template. `/` is the root; `:name` marks a placeholder.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let rest = raw
            .strip_prefix('/')
            .ok_or_else(|| PatternError::MissingLeadingSlash(raw.to_string()))?;

        let mut segments = Vec::new();
        if !rest.is_empty() {
            for part in rest.split('/') {
                let segment = match part.strip_prefix(':') {
                    Some("") => return Err(PatternError::UnnamedParam(raw.to_string())),
                    Some(name) => {
                        let segment = Segment::Param(name.to_string());
                        if segments.contains(&segment) {
                            return Err(PatternError::DuplicateParam {
                                pattern: raw.to_string(),
                                param: name.to_string(),
                            });
                        }
                        segment
                    }
                    None if part.is_empty() => {
                        return Err(PatternError::EmptySegment(raw.to_string()))
                    }
                    None => Segment::Literal(part.to_string()),
                };
                segments.push(segment);
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The template as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder names in template order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub fn is_static(&self) -> bool {
        self.param_names().next().is_none()
    }

    /// Match already-split, already-decoded input segments.
    ///
    /// Returns the captured parameters, or `None` when the template does not
    /// accept the input.
    pub fn matches<S: AsRef<str>>(&self, input: &[S]) -> Option<Params> {
        if input.len() != self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (segment, value) in self.segments.iter().zip(input) {
            let value = value.as_ref();
            if !segment.accepts(value) {
                return None;
            }
            if let Segment::Param(name) = segment {
                params.insert(name.clone(), value.to_string());
            }
        }
        Some(params)
    }

    /// Substitute every placeholder and percent-encode the values.
    ///
    /// On failure returns the name of the first placeholder that has no
    /// value. An empty value counts as missing since it could never match.
    pub fn build(&self, params: &Params) -> Result<String, String> {
        if self.segments.is_empty() {
            return Ok("/".to_string());
        }

        let mut path = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            path.push('/');
            match segment {
                Segment::Literal(text) => path.push_str(text),
                Segment::Param(name) => match params.get(name) {
                    Some(value) if !value.is_empty() => {
                        path.push_str(&urlencoding::encode(value))
                    }
                    _ => return Err(name.clone()),
                },
            }
        }
        Ok(path)
    }

    /// Whether at least one concrete path is accepted by both templates.
    pub fn overlaps(&self, other: &PathPattern) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a.overlaps(b))
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for PathPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_root_and_static() {
        let root = PathPattern::parse("/").unwrap();
        assert!(root.segments().is_empty());
        assert!(root.is_static());

        let results = PathPattern::parse("/thank-you").unwrap();
        assert_eq!(results.segments(), &[Segment::Literal("thank-you".into())]);
    }

    #[test]
    fn test_parse_placeholder() {
        let pattern = PathPattern::parse("/feedback/:exerciseId").unwrap();
        assert_eq!(
            pattern.segments(),
            &[
                Segment::Literal("feedback".into()),
                Segment::Param("exerciseId".into()),
            ]
        );
        assert_eq!(pattern.param_names().collect::<Vec<_>>(), vec!["exerciseId"]);
        assert!(!pattern.is_static());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(
            PathPattern::parse("results"),
            Err(PatternError::MissingLeadingSlash("results".into()))
        );
        assert!(matches!(
            PathPattern::parse("/a//b"),
            Err(PatternError::EmptySegment(_))
        ));
        assert!(matches!(
            PathPattern::parse("/results/"),
            Err(PatternError::EmptySegment(_))
        ));
        assert!(matches!(
            PathPattern::parse("/feedback/:"),
            Err(PatternError::UnnamedParam(_))
        ));
        assert!(matches!(
            PathPattern::parse("/:id/x/:id"),
            Err(PatternError::DuplicateParam { .. })
        ));
    }

    #[test]
    fn test_matches_captures_param() {
        let pattern = PathPattern::parse("/questionnaire/:slug").unwrap();
        assert_eq!(
            pattern.matches(&["questionnaire", "ex42"]),
            Some(params(&[("slug", "ex42")]))
        );
        assert_eq!(pattern.matches(&["questionnaire", ""]), None);
        assert_eq!(pattern.matches(&["questionnaire"]), None);
        assert_eq!(pattern.matches(&["Questionnaire", "ex42"]), None);
    }

    #[test]
    fn test_root_matches_only_empty_input() {
        let root = PathPattern::parse("/").unwrap();
        assert_eq!(root.matches::<&str>(&[]), Some(Params::new()));
        assert_eq!(root.matches(&["results"]), None);
    }

    #[test]
    fn test_build_encodes_values() {
        let pattern = PathPattern::parse("/feedback/:exerciseId").unwrap();
        assert_eq!(
            pattern.build(&params(&[("exerciseId", "ex 42/b")])).unwrap(),
            "/feedback/ex%2042%2Fb"
        );
        assert_eq!(PathPattern::parse("/").unwrap().build(&Params::new()).unwrap(), "/");
    }

    #[test]
    fn test_build_reports_missing_or_empty() {
        let pattern = PathPattern::parse("/feedback/:exerciseId").unwrap();
        assert_eq!(pattern.build(&Params::new()), Err("exerciseId".to_string()));
        assert_eq!(
            pattern.build(&params(&[("exerciseId", "")])),
            Err("exerciseId".to_string())
        );
        assert_eq!(
            pattern.build(&params(&[("slug", "ex42")])),
            Err("exerciseId".to_string())
        );
    }

    #[test]
    fn test_overlaps() {
        let a = PathPattern::parse("/feedback/:id").unwrap();
        let b = PathPattern::parse("/feedback/new").unwrap();
        let c = PathPattern::parse("/results/:id").unwrap();
        let d = PathPattern::parse("/feedback").unwrap();
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(!a.overlaps(&d));
    }
}
