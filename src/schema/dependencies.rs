use super::tables::{get_table, ALL_TABLES};
use super::types::TableSchema;
use crate::error::LoadError;
use std::collections::{HashMap, HashSet};

/// Resolves table dependencies from declared foreign keys
pub struct DependencyResolver {
    /// Map of table name -> tables it depends on
    deps: HashMap<&'static str, HashSet<&'static str>>,
}

impl DependencyResolver {
    pub fn new() -> Self {
        let deps = ALL_TABLES
            .iter()
            .map(|table| (table.name, table.dependencies()))
            .collect();

        Self { deps }
    }

    /// Parents of `table` (empty for unknown tables)
    pub fn parents(&self, table: &str) -> Vec<&'static str> {
        let mut parents: Vec<_> = self
            .deps
            .get(table)
            .map(|d| d.iter().copied().collect())
            .unwrap_or_default();
        parents.sort_unstable();
        parents
    }

    /// Check that every table comes after all of its FK parents
    pub fn check_order(&self, order: &[&str]) -> Result<(), LoadError> {
        let mut created: HashSet<&str> = HashSet::new();

        for name in order {
            if get_table(name).is_none() {
                return Err(LoadError::LoadOrder(format!("unknown table: {}", name)));
            }

            for parent in self.parents(name) {
                if parent != *name && !created.contains(parent) {
                    return Err(LoadError::LoadOrder(format!(
                        "{} is loaded before its parent {}",
                        name, parent
                    )));
                }
            }

            created.insert(name);
        }

        Ok(())
    }

    /// All tables in dependency order (parents before children).
    ///
    /// Ties keep the declaration order of `ALL_TABLES`.
    pub fn load_order(&self) -> Result<Vec<&'static TableSchema>, LoadError> {
        let mut result = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut temp_visited: HashSet<&str> = HashSet::new();

        for table in ALL_TABLES {
            self.visit(table.name, &mut visited, &mut temp_visited, &mut result)?;
        }

        Ok(result)
    }

    fn visit(
        &self,
        name: &'static str,
        visited: &mut HashSet<&'static str>,
        temp_visited: &mut HashSet<&'static str>,
        result: &mut Vec<&'static TableSchema>,
    ) -> Result<(), LoadError> {
        if temp_visited.contains(name) {
            return Err(LoadError::LoadOrder(format!(
                "circular dependency detected at: {}",
                name
            )));
        }
        if visited.contains(name) {
            return Ok(());
        }

        temp_visited.insert(name);

        for dep in self.parents(name) {
            if dep != name {
                self.visit(dep, visited, temp_visited, result)?;
            }
        }

        temp_visited.remove(name);
        visited.insert(name);

        if let Some(table) = get_table(name) {
            result.push(table);
        }

        Ok(())
    }
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new()
    }
}
