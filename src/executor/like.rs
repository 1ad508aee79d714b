// Copyright 2025 StrataDB Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! SQL LIKE pattern matching
//!
//! - `%` matches any sequence of characters (including empty)
//! - `_` matches any single character
//!
//! Patterns compile to an anchored regex once per scan.

use regex::Regex;

/// Compiled LIKE pattern
#[derive(Debug, Clone)]
pub struct LikeMatcher {
    pattern: String,
    regex: Option<Regex>,
}

impl LikeMatcher {
    /// Compile a LIKE pattern
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let regex = Self::compile_pattern(&pattern);
        Self { pattern, regex }
    }

    /// Compile SQL LIKE pattern to an anchored regex
    fn compile_pattern(pattern: &str) -> Option<Regex> {
        // Handle % and _ specially while escaping everything else.
        let mut regex_pattern = String::with_capacity(pattern.len() * 2);
        regex_pattern.push('^');
        for character in pattern.chars() {
            match character {
                '%' => regex_pattern.push_str(".*"),
                '_' => regex_pattern.push('.'),
                '.' | '+' | '*' | '?' | '^' | '$' | '(' | ')' | '[' | ']' | '{' | '}' | '|'
                | '\\' => {
                    regex_pattern.push('\\');
                    regex_pattern.push(character);
                }
                _ => regex_pattern.push(character),
            }
        }
        regex_pattern.push('$');
        Regex::new(&regex_pattern).ok()
    }

    /// Check whether a string matches the pattern
    pub fn matches(&self, value: &str) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(value),
            None => false,
        }
    }

    /// The original pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_semantics() {
        let starts = LikeMatcher::new("John%");
        assert!(starts.matches("John"));
        assert!(starts.matches("Johnson"));
        assert!(!starts.matches("ohnson"));

        let ends = LikeMatcher::new("%son");
        assert!(ends.matches("Johnson"));
        assert!(!ends.matches("sonja"));

        let single = LikeMatcher::new("h_t");
        assert!(single.matches("hat"));
        assert!(single.matches("hot"));
        assert!(!single.matches("heat"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let matcher = LikeMatcher::new("a.b*c%");
        assert!(matcher.matches("a.b*c"));
        assert!(matcher.matches("a.b*cde"));
        assert!(!matcher.matches("aXb*c"));
    }

    #[test]
    fn empty_pattern_matches_empty_string_only() {
        let matcher = LikeMatcher::new("");
        assert!(matcher.matches(""));
        assert!(!matcher.matches("x"));
    }
}
