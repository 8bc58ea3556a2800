use crate::error::ScopeError;

/// Settings for a [`ScopeRewriter`](super::ScopeRewriter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeConfig {
    /// Class name prefix; the scope id is appended to it.
    pub prefix: String,
    /// Presence attribute set on processed style elements.
    pub marker: String,
    /// First scope id handed out.
    pub first_id: u64,
    /// Parse every rewritten stylesheet with lightningcss and log failures.
    pub check_css: bool,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        ScopeConfig {
            prefix: "me__".to_string(),
            marker: "ready".to_string(),
            first_id: 1,
            check_css: false,
        }
    }
}

impl ScopeConfig {
    pub fn validate(&self) -> Result<(), ScopeError> {
        let prefix_ok = self
            .prefix
            .chars()
            .next()
            .is_some_and(|first| first.is_ascii_alphabetic() || first == '_' || first == '-')
            && self
                .prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !prefix_ok {
            return Err(ScopeError::InvalidPrefix(self.prefix.clone()));
        }

        // The HTML parser lowercases attribute names, so an uppercase marker
        // would never match a parsed document.
        let marker_ok = !self.marker.is_empty()
            && self.marker.chars().all(|c| {
                c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | ':' | '.')
            });
        if !marker_ok {
            return Err(ScopeError::InvalidMarker(self.marker.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ScopeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_prefixes() {
        for prefix in ["", "1abc", "me .", "scope!"] {
            let config = ScopeConfig {
                prefix: prefix.to_string(),
                ..ScopeConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ScopeError::InvalidPrefix(_))),
                "prefix {prefix:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_bad_markers() {
        for marker in ["", "Ready", "data ready", "x=y"] {
            let config = ScopeConfig {
                marker: marker.to_string(),
                ..ScopeConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ScopeError::InvalidMarker(_))
            ));
        }
    }
}
