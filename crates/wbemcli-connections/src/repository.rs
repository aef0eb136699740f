//! In-memory model of the connection repository file.

use std::collections::BTreeMap;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::definition::ConnectionDefinition;
use crate::error::StoreError;

/// Definitions keyed by name plus the default-connection pointer.
///
/// The pointer is either `None` or the key of a stored definition. Every
/// mutator preserves that, so a repository built through this API can always
/// be written back as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConnectionRepository {
    #[serde(default)]
    connection_definitions: BTreeMap<String, ConnectionDefinition>,
    #[serde(default)]
    default_connection_name: Option<String>,
}

impl ConnectionRepository {
    /// Returns true when no definitions are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connection_definitions.is_empty()
    }

    /// Number of stored definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.connection_definitions.len()
    }

    /// Looks up a definition by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ConnectionDefinition> {
        self.connection_definitions.get(name)
    }

    /// Returns true when `name` is stored.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.connection_definitions.contains_key(name)
    }

    /// Iterates definitions in name order.
    pub fn definitions(&self) -> impl Iterator<Item = &ConnectionDefinition> {
        self.connection_definitions.values()
    }

    /// Name of the default connection, if any.
    #[must_use]
    pub fn default_name(&self) -> Option<&str> {
        self.default_connection_name.as_deref()
    }

    /// The default connection definition, if any.
    #[must_use]
    pub fn default_definition(&self) -> Option<&ConnectionDefinition> {
        self.default_name().and_then(|name| self.get(name))
    }

    /// Inserts or replaces the definition stored under `name`.
    ///
    /// The definition's own name is overwritten with `name` so key and
    /// content agree. The default pointer is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidDefinition`] when the definition violates
    /// its invariants.
    pub fn upsert(
        &mut self,
        name: &str,
        mut definition: ConnectionDefinition,
    ) -> Result<Option<ConnectionDefinition>, StoreError> {
        name.clone_into(&mut definition.name);
        definition
            .validate()
            .map_err(|source| StoreError::InvalidDefinition {
                name: name.to_owned(),
                source,
            })?;
        Ok(self
            .connection_definitions
            .insert(name.to_owned(), definition))
    }

    /// Removes the definition stored under `name`.
    ///
    /// Clears the default pointer when it referenced the removed definition.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when `name` is not stored.
    pub fn remove(
        &mut self,
        name: &str,
        path: &Utf8Path,
    ) -> Result<ConnectionDefinition, StoreError> {
        let removed = self
            .connection_definitions
            .remove(name)
            .ok_or_else(|| not_found(name, path))?;
        if self.default_connection_name.as_deref() == Some(name) {
            self.default_connection_name = None;
        }
        Ok(removed)
    }

    /// Points the default connection at `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when `name` is not stored.
    pub fn set_default(&mut self, name: &str, path: &Utf8Path) -> Result<(), StoreError> {
        if !self.contains(name) {
            return Err(not_found(name, path));
        }
        self.default_connection_name = Some(name.to_owned());
        Ok(())
    }

    /// Clears the default pointer.
    pub fn clear_default(&mut self) {
        self.default_connection_name = None;
    }

    /// Repairs a repository read from disk.
    ///
    /// Keys are authoritative for names, and a default pointer that names no
    /// stored definition is dropped with a warning.
    pub(crate) fn normalise(&mut self, path: &Utf8Path) {
        for (key, definition) in &mut self.connection_definitions {
            if definition.name != *key {
                key.clone_into(&mut definition.name);
            }
        }
        let dangling = self
            .default_connection_name
            .as_deref()
            .filter(|name| !self.connection_definitions.contains_key(*name))
            .map(str::to_owned);
        if let Some(name) = dangling {
            warn!(
                target: "wbemcli::store",
                path = %path,
                default = %name,
                "default connection does not exist; clearing it"
            );
            self.default_connection_name = None;
        }
    }
}

fn not_found(name: &str, path: &Utf8Path) -> StoreError {
    StoreError::NotFound {
        name: name.to_owned(),
        path: path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    const PATH: &str = "conns.yaml";

    #[fixture]
    fn repository() -> ConnectionRepository {
        let mut repository = ConnectionRepository::default();
        repository
            .upsert("a", ConnectionDefinition::with_server("a", "http://a"))
            .expect("insert a");
        repository
            .upsert("b", ConnectionDefinition::with_server("b", "http://b"))
            .expect("insert b");
        repository
    }

    #[rstest]
    fn upsert_replaces_existing_entries(mut repository: ConnectionRepository) {
        let previous = repository
            .upsert("a", ConnectionDefinition::with_server("ignored", "http://other"))
            .expect("replace a");
        assert_eq!(previous.map(|definition| definition.server_url), Some(Some(String::from("http://a"))));
        let stored = repository.get("a").expect("a stored");
        assert_eq!(stored.name, "a");
        assert_eq!(stored.server_url.as_deref(), Some("http://other"));
        assert_eq!(repository.len(), 2);
    }

    #[rstest]
    fn upsert_does_not_touch_default(mut repository: ConnectionRepository) {
        repository.set_default("a", Utf8Path::new(PATH)).expect("set default");
        repository
            .upsert("c", ConnectionDefinition::with_server("c", "http://c"))
            .expect("insert c");
        assert_eq!(repository.default_name(), Some("a"));
    }

    #[rstest]
    fn removing_default_clears_pointer(mut repository: ConnectionRepository) {
        repository.set_default("b", Utf8Path::new(PATH)).expect("set default");
        repository.remove("b", Utf8Path::new(PATH)).expect("remove b");
        assert_eq!(repository.default_name(), None);
        assert!(repository.default_definition().is_none());
    }

    #[rstest]
    fn removing_other_keeps_pointer(mut repository: ConnectionRepository) {
        repository.set_default("b", Utf8Path::new(PATH)).expect("set default");
        repository.remove("a", Utf8Path::new(PATH)).expect("remove a");
        assert_eq!(repository.default_name(), Some("b"));
    }

    #[rstest]
    fn unknown_names_are_not_found(mut repository: ConnectionRepository) {
        assert!(matches!(
            repository.remove("zzz", Utf8Path::new(PATH)),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            repository.set_default("zzz", Utf8Path::new(PATH)),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn invalid_definitions_are_refused() {
        let mut repository = ConnectionRepository::default();
        let mut definition = ConnectionDefinition::with_server("bad", "http://a");
        definition.pull_max_cnt = 0;
        assert!(matches!(
            repository.upsert("bad", definition),
            Err(StoreError::InvalidDefinition { .. })
        ));
        assert!(repository.is_empty());
    }

    #[test]
    fn normalise_drops_dangling_default_and_fixes_names() {
        let mut repository = ConnectionRepository::default();
        repository
            .connection_definitions
            .insert(String::from("key"), ConnectionDefinition::with_server("other", "http://a"));
        repository.default_connection_name = Some(String::from("missing"));
        repository.normalise(Utf8Path::new(PATH));
        assert_eq!(repository.default_name(), None);
        assert_eq!(repository.get("key").map(|d| d.name.as_str()), Some("key"));
    }
}
