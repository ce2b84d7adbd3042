//! TOML-backed maximum-area policy store.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use clipship_core::error::PolicyError;
use clipship_core::ports::MaxAreaStore;

#[derive(Debug, Default, Deserialize)]
struct PolicyFile {
    #[serde(default)]
    default_max_area: Option<f64>,

    #[serde(default)]
    policies: HashMap<String, f64>,
}

/// Per-layer maximum extractable area policies read from a TOML table:
///
/// ```toml
/// default_max_area = 4.0e11
///
/// [policies]
/// elevation = 1.0e9
/// orthophotos = 2.5e8
/// ```
#[derive(Debug, Default)]
pub struct TomlPolicyStore {
    policies: HashMap<String, f64>,
    default_max_area: Option<f64>,
    unavailable: Option<String>,
}

impl TomlPolicyStore {
    /// Load the table from `path`. A missing or unparsable file does not
    /// error here; it yields a store whose lookups report the table as
    /// unavailable, so admission control logs an error and falls back to
    /// the global default.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                return Self::unavailable(format!("{} does not exist or cannot be read: {e}", path.display()))
            }
        };
        match toml::from_str::<PolicyFile>(&content) {
            Ok(file) => Self {
                policies: file.policies,
                default_max_area: file.default_max_area,
                unavailable: None,
            },
            Err(e) => Self::unavailable(format!("{} cannot be parsed: {e}", path.display())),
        }
    }

    /// A reachable table with no entries: every lookup is `Ok(None)`.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self { policies: entries.into_iter().collect(), ..Self::default() }
    }

    /// An unreachable table: every lookup is `Err`.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self { unavailable: Some(reason.into()), ..Self::default() }
    }

    /// Table-level default maximum area, if the file declared one.
    pub fn default_max_area(&self) -> Option<f64> {
        self.default_max_area
    }
}

impl MaxAreaStore for TomlPolicyStore {
    fn max_area_for(&self, layer_base_name: &str) -> Result<Option<f64>, PolicyError> {
        if let Some(reason) = &self.unavailable {
            return Err(PolicyError::Unavailable { reason: reason.clone() });
        }
        Ok(self.policies.get(layer_base_name).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_and_lookup() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("max_areas.toml");
        fs::write(
            &path,
            r#"
            default_max_area = 4.0e11

            [policies]
            elevation = 1.0e9
            "#,
        )
        .unwrap();

        let store = TomlPolicyStore::load(&path);
        assert_eq!(store.max_area_for("elevation").unwrap(), Some(1.0e9));
        assert_eq!(store.max_area_for("roads").unwrap(), None);
        assert_eq!(store.default_max_area(), Some(4.0e11));
    }

    #[test]
    fn test_missing_table_is_unavailable() {
        let store = TomlPolicyStore::load(Path::new("/nonexistent/max_areas.toml"));
        assert!(store.max_area_for("roads").is_err());
    }

    #[test]
    fn test_unparsable_table_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("max_areas.toml");
        fs::write(&path, "not [valid toml").unwrap();
        assert!(TomlPolicyStore::load(&path).max_area_for("roads").is_err());
    }

    #[test]
    fn test_empty_store_has_no_entries() {
        let store = TomlPolicyStore::empty();
        assert_eq!(store.max_area_for("anything").unwrap(), None);
    }
}
