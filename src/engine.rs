//! `GraphEngine`: the catalog plus whichever database is currently
//! selected. The single entry point shared by the interactive shell and the
//! HTTP facade.

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{DBResult, NotFoundError};
use crate::query;
use crate::storage::Database;
use crate::value::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

pub struct GraphEngine {
    catalog: Catalog,
    current_name: Option<String>,
    active: Option<Database>,
}

impl GraphEngine {
    pub fn open(config: &Config) -> DBResult<Self> {
        let storage_dir = PathBuf::from(&config.storage_dir);
        let catalog = Catalog::open(storage_dir, &config.registry_file)?;
        Ok(GraphEngine { catalog, current_name: None, active: None })
    }

    pub fn current_database_name(&self) -> Option<&str> {
        self.current_name.as_deref()
    }

    fn active_mut(&mut self) -> DBResult<&mut Database> {
        self.active.as_mut().ok_or_else(|| NotFoundError::NoActiveDatabase.into())
    }

    fn active(&self) -> DBResult<&Database> {
        self.active.as_ref().ok_or_else(|| NotFoundError::NoActiveDatabase.into())
    }

    // ---- catalog operations ----

    pub fn create_database(&mut self, name: &str) -> DBResult<()> {
        self.catalog.create_database(name)?;
        Ok(())
    }

    pub fn delete_database(&mut self, name: &str) -> DBResult<()> {
        self.catalog.delete_database(name)?;
        if self.current_name.as_deref() == Some(name) {
            self.current_name = None;
            self.active = None;
        }
        Ok(())
    }

    pub fn rename_database(&mut self, old_name: &str, new_name: &str) -> DBResult<()> {
        self.catalog.rename_database(old_name, new_name)?;
        if self.current_name.as_deref() == Some(old_name) {
            self.current_name = Some(new_name.to_string());
        }
        Ok(())
    }

    pub fn list_databases(&self) -> Vec<String> {
        self.catalog.list_databases()
    }

    pub fn use_database(&mut self, name: &str) -> DBResult<()> {
        let db = self.catalog.use_database(name)?;
        self.current_name = Some(name.to_string());
        self.active = Some(db);
        Ok(())
    }

    pub fn backup_database(&self, name: &str, backup_base: &str) -> DBResult<()> {
        self.catalog.backup_database(name, backup_base)
    }

    pub fn restore_database(&mut self, name: &str, backup_base: &str) -> DBResult<()> {
        let restored = self.catalog.restore_database(name, backup_base)?;
        if self.current_name.as_deref() == Some(name) {
            self.active = Some(restored);
        }
        Ok(())
    }

    pub fn export_database(&self, name: &str, export_base: &str) -> DBResult<()> {
        self.catalog.export_database(name, export_base)
    }

    pub fn import_database(&mut self, name: &str, import_base: &str, merge: bool) -> DBResult<()> {
        let imported = self.catalog.import_database(name, import_base, merge)?;
        if self.current_name.as_deref() == Some(name) {
            self.active = Some(imported);
        }
        Ok(())
    }

    // ---- operations on the active database ----

    pub fn add_node(&mut self, value: HashMap<String, Value>) -> DBResult<Uuid> {
        self.active_mut()?.add_node(value)
    }

    pub fn update_node(&mut self, id: Uuid, partial: HashMap<String, Value>) -> DBResult<()> {
        self.active_mut()?.update_node(id, partial)
    }

    pub fn delete_node(&mut self, id: Uuid) -> DBResult<()> {
        self.active_mut()?.delete_node(id)
    }

    pub fn add_edge(&mut self, a: Uuid, b: Uuid, label: Option<String>, weight: Option<f64>) -> DBResult<()> {
        self.active_mut()?.add_edge(a, b, label, weight)
    }

    pub fn delete_edge(&mut self, a: Uuid, b: Uuid) -> DBResult<()> {
        self.active_mut()?.delete_edge(a, b)
    }

    pub fn get_value(&self, id: Uuid) -> DBResult<HashMap<String, Value>> {
        Ok(self.active()?.get_value(id))
    }

    pub fn list_all_nodes(&self) -> DBResult<HashMap<Uuid, HashMap<String, Value>>> {
        Ok(self.active()?.list_all_nodes())
    }

    pub fn get_edges(&self, id: Uuid) -> DBResult<HashMap<Uuid, crate::model::EdgeProps>> {
        Ok(self.active()?.get_edges(id))
    }

    pub fn find_by_name(&self, query: &str) -> DBResult<Vec<Uuid>> {
        Ok(self.active()?.find_by_name(query))
    }

    pub fn find_path(&self, start: Uuid, end: Uuid) -> DBResult<Option<Vec<Uuid>>> {
        self.active()?.find_path(start, end)
    }

    pub fn create_index(&mut self, attr: &str) -> DBResult<()> {
        self.active_mut()?.create_index(attr)
    }

    pub fn drop_index(&mut self, attr: &str) -> DBResult<()> {
        self.active_mut()?.drop_index(attr)
    }

    pub fn list_indexes(&self) -> DBResult<Vec<String>> {
        Ok(self.active()?.list_indexes())
    }

    pub fn query(
        &self,
        query_string: &str,
        cast_non_strings: bool,
        case_sensitive: bool,
    ) -> DBResult<Vec<(Uuid, HashMap<String, Value>)>> {
        let db = self.active()?;
        let results = query::run(db.vertices(), db.indexes(), query_string, cast_non_strings, case_sensitive)
            .map_err(crate::error::DBError::Validation)?;
        Ok(results.into_iter().map(|(id, v)| (id, v.value.clone())).collect())
    }

    // ---- transactions ----

    pub fn begin(&mut self) -> DBResult<()> {
        self.active_mut()?.begin()
    }

    pub fn commit(&mut self) -> DBResult<()> {
        self.active_mut()?.commit()
    }

    pub fn rollback(&mut self) -> DBResult<()> {
        self.active_mut()?.rollback()
    }

    pub fn stop(&mut self) -> DBResult<()> {
        self.active_mut()?.stop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> (tempfile::TempDir, GraphEngine) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config { storage_dir: dir.path().to_string_lossy().into_owned(), ..Config::default() };
        let engine = GraphEngine::open(&config).unwrap();
        (dir, engine)
    }

    #[test]
    fn operations_fail_without_an_active_database() {
        let (_dir, mut engine) = engine();
        assert!(engine.add_node(HashMap::new()).is_err());
    }

    #[test]
    fn create_use_add_and_query() {
        let (_dir, mut engine) = engine();
        engine.create_database("people").unwrap();
        engine.use_database("people").unwrap();
        engine
            .add_node(HashMap::from([
                ("name".to_string(), Value::String("Alice".into())),
                ("age".to_string(), Value::Int(30)),
            ]))
            .unwrap();
        let results = engine.query("WHERE age = 30", false, true).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn deleting_the_active_database_clears_selection() {
        let (_dir, mut engine) = engine();
        engine.create_database("people").unwrap();
        engine.use_database("people").unwrap();
        engine.delete_database("people").unwrap();
        assert!(engine.current_database_name().is_none());
        assert!(engine.add_node(HashMap::new()).is_err());
    }
}
