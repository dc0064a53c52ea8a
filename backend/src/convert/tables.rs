//! Token and delimiter tables used by the coercer.
//!
//! Built once at startup and shared read-only by every conversion.

/// Tokens coerced to `true` (compared case-insensitively).
pub const TRUE_TOKENS: [&str; 6] = ["yes", "y", "true", "on", "1", "t"];

/// Tokens coerced to `false` (compared case-insensitively).
pub const FALSE_TOKENS: [&str; 6] = ["no", "n", "false", "off", "0", "f"];

/// Characters separating collection elements. All are accepted within the same value.
pub const LIST_DELIMITERS: [char; 3] = [',', '#', '|'];

/// Characters kept inside collection elements even when also listed as delimiters.
pub const LIST_ALLOWED_CHARS: [char; 1] = ['_'];

/// Immutable conversion vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionTables {
    pub true_tokens: Vec<String>,
    pub false_tokens: Vec<String>,
    pub delimiters: Vec<char>,
    pub allowed_chars: Vec<char>,
}

impl ConversionTables {
    pub fn new() -> Self {
        Self {
            true_tokens: TRUE_TOKENS.iter().map(|t| t.to_string()).collect(),
            false_tokens: FALSE_TOKENS.iter().map(|t| t.to_string()).collect(),
            delimiters: LIST_DELIMITERS.to_vec(),
            allowed_chars: LIST_ALLOWED_CHARS.to_vec(),
        }
    }

    /// Match a boolean token. `None` when the token is in neither set.
    pub fn boolean_token(&self, token: &str) -> Option<bool> {
        if self.true_tokens.iter().any(|t| t.eq_ignore_ascii_case(token)) {
            Some(true)
        } else if self.false_tokens.iter().any(|t| t.eq_ignore_ascii_case(token)) {
            Some(false)
        } else {
            None
        }
    }

    /// Whether `c` separates collection elements. Allowed characters never do.
    pub fn is_delimiter(&self, c: char) -> bool {
        self.delimiters.contains(&c) && !self.allowed_chars.contains(&c)
    }
}

impl Default for ConversionTables {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_tokens_case_insensitive() {
        let tables = ConversionTables::new();
        assert_eq!(tables.boolean_token("YES"), Some(true));
        assert_eq!(tables.boolean_token("Off"), Some(false));
        assert_eq!(tables.boolean_token("maybe"), None);
    }

    #[test]
    fn test_delimiters() {
        let tables = ConversionTables::new();
        for d in LIST_DELIMITERS {
            assert!(tables.is_delimiter(d));
        }
        assert!(!tables.is_delimiter('_'));
        assert!(!tables.is_delimiter('%'));
    }

    #[test]
    fn test_allowed_chars_win_over_delimiters() {
        let tables = ConversionTables {
            delimiters: vec![',', '-'],
            allowed_chars: vec!['-'],
            ..ConversionTables::new()
        };
        assert!(tables.is_delimiter(','));
        assert!(!tables.is_delimiter('-'));
    }
}
