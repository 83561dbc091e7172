use regex::Regex;
use serde::{Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

use crate::errors::{ErrorCode, GateError};

/// Maximum number of path captures before heap allocation.
/// Most REST APIs have ≤4 path params (e.g. `/users/:id/posts/:post_id`).
pub const MAX_INLINE_CAPTURES: usize = 8;

/// Positional captures in template order: `(param name, raw segment)`.
///
/// Names are `Arc<str>` shared with the compiled pattern, so collecting
/// captures never copies them.
pub type CaptureVec = SmallVec<[(Arc<str>, String); MAX_INLINE_CAPTURES]>;

/// A compiled route template.
///
/// Templates use `:name` or `{name}` placeholders, which may sit anywhere in
/// a segment (`/files/:name.:ext`). Each placeholder matches one non-empty
/// run of characters other than `/`, `#` and `?`. Matching is
/// case-insensitive and tolerates a single trailing slash.
#[derive(Clone)]
pub struct PathPattern {
    template: String,
    regex: Regex,
    param_names: Vec<Arc<str>>,
}

enum Token<'a> {
    Literal(&'a str),
    Param(&'a str),
}

impl PathPattern {
    /// Compile a normalised template.
    ///
    /// Fails with [`ErrorCode::InvalidPathParams`] when a placeholder name is
    /// used twice.
    ///
    /// ```rust
    /// use restgate::paths::PathPattern;
    ///
    /// let pattern = PathPattern::compile("/users/:id").unwrap();
    /// assert_eq!(pattern.param_names(), vec!["id"]);
    /// assert!(pattern.is_match("/users/123"));
    /// assert!(pattern.is_match("/USERS/123/"));
    /// assert!(!pattern.is_match("/users"));
    /// ```
    pub fn compile(template: &str) -> Result<Self, GateError> {
        if template == "/" {
            return Ok(Self {
                template: template.to_string(),
                regex: build_regex(r"(?i)^/$")?,
                param_names: Vec::new(),
            });
        }

        let tokens = tokenize(template);
        let mut pattern = String::with_capacity(template.len() + 16);
        pattern.push_str("(?i)^");
        let mut param_names: Vec<Arc<str>> = Vec::new();

        for token in tokens {
            match token {
                Token::Literal(text) => pattern.push_str(&regex::escape(text)),
                Token::Param(name) => {
                    if param_names.iter().any(|existing| existing.as_ref() == name) {
                        return Err(GateError::with_content(
                            ErrorCode::InvalidPathParams,
                            format!("duplicate path parameter '{name}'"),
                        ));
                    }
                    pattern.push_str("([^/#?]+?)");
                    param_names.push(Arc::from(name));
                }
            }
        }

        pattern.push_str("/?$");

        Ok(Self {
            template: template.to_string(),
            regex: build_regex(&pattern)?,
            param_names,
        })
    }

    /// The template this pattern was compiled from.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The compiled regular expression source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Placeholder names, left to right as they appear in the template.
    #[must_use]
    pub fn param_names(&self) -> Vec<&str> {
        self.param_names.iter().map(|name| name.as_ref()).collect()
    }

    #[inline]
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Captured segments paired with their placeholder names, or `None` if
    /// the path does not match.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<CaptureVec> {
        let caps = self.regex.captures(path)?;
        let mut out = CaptureVec::new();
        for (index, name) in self.param_names.iter().enumerate() {
            let value = caps.get(index + 1).map(|m| m.as_str()).unwrap_or_default();
            out.push((Arc::clone(name), value.to_string()));
        }
        Some(out)
    }
}

impl fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathPattern")
            .field("template", &self.template)
            .field("regex", &self.regex.as_str())
            .field("param_names", &self.param_names)
            .finish()
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.regex.as_str() == other.regex.as_str()
    }
}

impl Serialize for PathPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.regex.as_str())
    }
}

fn build_regex(pattern: &str) -> Result<Regex, GateError> {
    Regex::new(pattern)
        .map_err(|err| GateError::with_content(ErrorCode::InvalidPath, err.to_string()))
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Splits a template into literal runs and placeholders.
///
/// A `:` not followed by a name character, or a `{` without a closing `}`
/// around a valid name, stays literal.
fn tokenize(template: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut literal_start = 0;
    let mut iter = template.char_indices().peekable();

    while let Some((pos, c)) = iter.next() {
        let placeholder = match c {
            ':' => {
                let start = pos + 1;
                let end = template[start..]
                    .find(|ch: char| !is_name_char(ch))
                    .map_or(template.len(), |offset| start + offset);
                (end > start).then_some((start, end, end))
            }
            '{' => template[pos + 1..].find('}').and_then(|offset| {
                let start = pos + 1;
                let end = start + offset;
                let name = &template[start..end];
                (!name.is_empty() && name.chars().all(is_name_char))
                    .then_some((start, end, end + 1))
            }),
            _ => None,
        };

        if let Some((start, end, resume)) = placeholder {
            if literal_start < pos {
                tokens.push(Token::Literal(&template[literal_start..pos]));
            }
            tokens.push(Token::Param(&template[start..end]));
            literal_start = resume;
            while iter.peek().is_some_and(|(next, _)| *next < resume) {
                iter.next();
            }
        }
    }

    if literal_start < template.len() {
        tokens.push(Token::Literal(&template[literal_start..]));
    }
    tokens
}
