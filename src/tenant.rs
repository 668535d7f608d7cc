//! Per-deployment tenant schema. Every table lives in `project_{PROJECT_ID}`;
//! the name is derived once from configuration and passed to the store.

use crate::error::ConfigError;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TenantSchema {
    name: String,
}

impl TenantSchema {
    /// Project ids become part of an SQL identifier, so only ASCII
    /// alphanumerics and underscores are accepted.
    pub fn for_project(project_id: &str) -> Result<Self, ConfigError> {
        let id = project_id.trim();
        if id.is_empty() || id.len() > 48 || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ConfigError::Invalid {
                key: "PROJECT_ID",
                message: format!("'{}' must be 1-48 ASCII letters, digits or underscores", project_id),
            });
        }
        Ok(TenantSchema {
            name: format!("project_{}", id.to_lowercase()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema-qualified, quoted table name (e.g. `"project_7"."books"`).
    pub fn qualified(&self, table: &str) -> String {
        format!("{}.{}", quote_ident(&self.name), quote_ident(table))
    }
}

impl fmt::Display for TenantSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Quote identifier for PostgreSQL.
pub fn quote_ident(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_name_is_prefixed_and_qualified() {
        let t = TenantSchema::for_project("Acme_01").unwrap();
        assert_eq!(t.name(), "project_acme_01");
        assert_eq!(t.qualified("books"), "\"project_acme_01\".\"books\"");
    }

    #[test]
    fn unsafe_project_ids_are_rejected() {
        for bad in ["", "a-b", "x\"; DROP SCHEMA public; --", "ünicode"] {
            assert!(TenantSchema::for_project(bad).is_err(), "{}", bad);
        }
    }
}
