//! Cursor configuration.
//!
//! Configuration is passed explicitly into [`Cursor::new`](crate::Cursor::new) and can be
//! replaced with [`Cursor::set_config`](crate::Cursor::set_config). Nothing here is cached: the
//! word pattern is derived from the current value every time it is needed.

use crate::error::CursorError;
use crate::layout::DEFAULT_TAB_WIDTH;
use serde::{Deserialize, Serialize};

/// Characters that never belong to a word unless configured otherwise.
pub const DEFAULT_NON_WORD_CHARACTERS: &str = "/\\()\"':,.;<>~!@#$%^&*|+=[]{}`?-…";

/// Per-cursor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    /// Characters treated as word separators (in addition to whitespace).
    pub non_word_characters: String,
    /// Width of an indentation unit, in columns.
    pub tab_width: usize,
    /// Whether indentation is made of spaces rather than tab characters.
    pub soft_tabs: bool,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            non_word_characters: DEFAULT_NON_WORD_CHARACTERS.to_string(),
            tab_width: DEFAULT_TAB_WIDTH,
            soft_tabs: true,
        }
    }
}

impl CursorConfig {
    /// Parse a configuration object from JSON. Missing fields take their defaults.
    ///
    /// ```rust
    /// use editor_cursor::CursorConfig;
    ///
    /// let config = CursorConfig::from_json_str(r#"{ "tab_width": 2 }"#).unwrap();
    /// assert_eq!(config.tab_width, 2);
    /// assert!(config.soft_tabs);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, CursorError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), CursorError> {
        if self.tab_width == 0 {
            return Err(CursorError::InvalidConfig("tab_width must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CursorConfig::default();
        assert_eq!(config.tab_width, DEFAULT_TAB_WIDTH);
        assert!(config.soft_tabs);
        assert!(config.non_word_characters.contains('('));
        assert!(config.non_word_characters.contains('…'));
        assert!(!config.non_word_characters.contains('_'));
        assert!(!config.non_word_characters.contains(' '));
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            CursorConfig::from_json_str(r#"{ "non_word_characters": "-", "soft_tabs": false }"#)
                .unwrap();
        assert_eq!(config.non_word_characters, "-");
        assert!(!config.soft_tabs);
        assert_eq!(config.tab_width, DEFAULT_TAB_WIDTH);
    }

    #[test]
    fn test_from_json_rejects_zero_tab_width() {
        let err = CursorConfig::from_json_str(r#"{ "tab_width": 0 }"#).unwrap_err();
        assert!(matches!(err, CursorError::InvalidConfig(_)));
    }

    #[test]
    fn test_from_json_reports_parse_errors() {
        let err = CursorConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, CursorError::ConfigParse(_)));
    }
}
