use regex::Regex;

use crate::error::{Error, Result};

/// Compiled include/exclude filter for record descriptions
///
/// Patterns match from the start of the description, like a prefix match
/// with full regex syntax.
#[derive(Clone, Default)]
pub struct DescriptionFilter {
    /// Description must match at least one of these (empty = all)
    include: Vec<Regex>,

    /// Description must match none of these
    exclude: Vec<Regex>,

    /// Original pattern strings, kept for diagnostics
    include_patterns: Vec<String>,
    exclude_patterns: Vec<String>,
}

impl DescriptionFilter {
    /// Compile both pattern sets, failing on the first invalid pattern
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self> {
        Ok(Self {
            include: compile_all(include)?,
            exclude: compile_all(exclude)?,
            include_patterns: include.iter().map(|p| p.as_ref().to_string()).collect(),
            exclude_patterns: exclude.iter().map(|p| p.as_ref().to_string()).collect(),
        })
    }

    /// Check if a record with this description should be kept
    pub fn accepts(&self, description: &str) -> bool {
        if !self.include.is_empty() && !self.include.iter().any(|re| re.is_match(description)) {
            return false;
        }

        !self.exclude.iter().any(|re| re.is_match(description))
    }

    /// Check if filter is empty (accepts everything)
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    pub fn include_patterns(&self) -> &[String] {
        &self.include_patterns
    }

    pub fn exclude_patterns(&self) -> &[String] {
        &self.exclude_patterns
    }
}

impl std::fmt::Debug for DescriptionFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptionFilter")
            .field("include", &self.include_patterns)
            .field("exclude", &self.exclude_patterns)
            .finish()
    }
}

fn compile_all<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            let pattern = p.as_ref();
            // Anchor at the start only; trailing text is allowed
            Regex::new(&format!("^(?:{})", pattern)).map_err(|source| Error::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
        })
        .collect()
}
