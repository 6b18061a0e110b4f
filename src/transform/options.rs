//! Options for registration and for the rewriting engine.

use serde::{Deserialize, Serialize};

/// Options accepted when registering a plugin or URL callback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterOptions {
    /// Higher priorities run first. Defaults to 0.
    pub priority: i32,
}

impl RegisterOptions {
    pub fn priority(priority: i32) -> Self {
        Self { priority }
    }
}

/// Settings merged into every `lol_html` call.
///
/// Unset fields fall back to the engine defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessOptions {
    /// Bail out on markup the engine cannot handle unambiguously
    pub strict: Option<bool>,
    /// Treat `<esi:include>` as a void element
    pub enable_esi_tags: Option<bool>,
}

impl ProcessOptions {
    /// Merge `other` into `self`; fields set in `other` win.
    pub fn merge(&mut self, other: ProcessOptions) {
        if other.strict.is_some() {
            self.strict = other.strict;
        }
        if other.enable_esi_tags.is_some() {
            self.enable_esi_tags = other.enable_esi_tags;
        }
    }

    pub(crate) fn strict_or_default(&self) -> bool {
        self.strict.unwrap_or(true)
    }

    pub(crate) fn esi_or_default(&self) -> bool {
        self.enable_esi_tags.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_later_keys_win() {
        let mut options = ProcessOptions {
            strict: Some(true),
            enable_esi_tags: Some(true),
        };
        options.merge(ProcessOptions {
            strict: Some(false),
            enable_esi_tags: None,
        });

        assert_eq!(options.strict, Some(false));
        assert_eq!(options.enable_esi_tags, Some(true));
    }

    #[test]
    fn test_engine_defaults() {
        let options = ProcessOptions::default();
        assert!(options.strict_or_default());
        assert!(!options.esi_or_default());
    }
}
