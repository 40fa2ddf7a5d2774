//! The database catalog: a name -> base-filename registry, persisted as
//! `registry.json`. Grounded on `ADBMS/kk.py`'s `DatabaseManager` class —
//! every method here corresponds to one of its methods, file for file.

use crate::error::{DBError, DBResult, IoError, NotFoundError, ValidationError};
use crate::model::{EdgeProps, Vertex};
use crate::storage::Database;
use crate::value::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub struct Catalog {
    storage_dir: PathBuf,
    registry_path: PathBuf,
    /// name -> base filename, e.g. "people" -> "people.json".
    registry: HashMap<String, String>,
}

fn nodes_file(base: &str) -> String {
    base.replace(".json", "_nodes.json")
}

fn indexes_file(base: &str) -> String {
    base.replace(".json", "_indexes.json")
}

fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl Catalog {
    /// Loads `registry.json` under `storage_dir` (creating the directory if
    /// needed), then prunes any entry whose companion files are both
    /// missing or whose nodes file fails to parse — logged as a warning,
    /// never a fatal error, exactly like the reference implementation's
    /// startup validation pass.
    pub fn open(storage_dir: PathBuf, registry_file: &str) -> DBResult<Self> {
        std::fs::create_dir_all(&storage_dir).map_err(|source| IoError::Write {
            path: storage_dir.display().to_string(),
            source,
        })?;
        let registry_path = storage_dir.join(registry_file);
        let registry = Self::load_registry(&registry_path);
        let mut catalog = Catalog { storage_dir, registry_path, registry };
        catalog.prune_invalid();
        Ok(catalog)
    }

    fn load_registry(path: &Path) -> HashMap<String, String> {
        match std::fs::read(path) {
            Ok(bytes) if !bytes.is_empty() => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                log::warn!("invalid or inaccessible registry at {}: {e}; starting fresh", path.display());
                HashMap::new()
            }),
            _ => HashMap::new(),
        }
    }

    fn save_registry(&self) -> DBResult<()> {
        let bytes = serde_json::to_vec_pretty(&self.registry).expect("registry is serializable");
        crate::storage::atomic_write(&self.registry_path, &bytes).map_err(|source| {
            DBError::Io(IoError::Write { path: self.registry_path.display().to_string(), source })
        })
    }

    fn prune_invalid(&mut self) {
        let mut invalid = Vec::new();
        for (name, base) in &self.registry {
            let nodes = self.storage_dir.join(nodes_file(base));
            let indexes = self.storage_dir.join(indexes_file(base));
            if !nodes.exists() && !indexes.exists() {
                log::warn!("database files for '{name}' not found, removing from registry");
                invalid.push(name.clone());
                continue;
            }
            if nodes.exists() {
                if let Ok(bytes) = std::fs::read(&nodes) {
                    if !bytes.is_empty() && serde_json::from_slice::<HashMap<Uuid, Vertex>>(&bytes).is_err() {
                        log::warn!("failed to validate database '{name}': invalid nodes file, removing from registry");
                        invalid.push(name.clone());
                    }
                }
            }
        }
        if !invalid.is_empty() {
            for name in &invalid {
                self.registry.remove(name);
            }
            let _ = self.save_registry();
        }
    }

    fn paths_for(&self, base: &str) -> (PathBuf, PathBuf) {
        (self.storage_dir.join(nodes_file(base)), self.storage_dir.join(indexes_file(base)))
    }

    pub fn list_databases(&self) -> Vec<String> {
        self.registry.keys().cloned().collect()
    }

    pub fn create_database(&mut self, name: &str) -> DBResult<Database> {
        if !valid_name(name) {
            return Err(ValidationError::InvalidName(name.to_string()).into());
        }
        if self.registry.contains_key(name) {
            return Err(ValidationError::DuplicateDatabase(name.to_string()).into());
        }
        let base = format!("{name}.json");
        self.registry.insert(name.to_string(), base.clone());
        self.save_registry()?;
        let (nodes, indexes) = self.paths_for(&base);
        let db = Database::open(nodes, indexes);
        db.save_public()?;
        log::info!("created database '{name}'");
        Ok(db)
    }

    pub fn delete_database(&mut self, name: &str) -> DBResult<()> {
        let base = self.registry.get(name).cloned().ok_or_else(|| NotFoundError::Database(name.to_string()))?;
        let (nodes, indexes) = self.paths_for(&base);
        let _ = std::fs::remove_file(&nodes);
        let _ = std::fs::remove_file(&indexes);
        self.registry.remove(name);
        self.save_registry()?;
        log::info!("deleted database '{name}'");
        Ok(())
    }

    pub fn rename_database(&mut self, old_name: &str, new_name: &str) -> DBResult<()> {
        let old_base = self
            .registry
            .get(old_name)
            .cloned()
            .ok_or_else(|| NotFoundError::Database(old_name.to_string()))?;
        if !valid_name(new_name) {
            return Err(ValidationError::InvalidName(new_name.to_string()).into());
        }
        if self.registry.contains_key(new_name) {
            return Err(ValidationError::DuplicateDatabase(new_name.to_string()).into());
        }
        let new_base = format!("{new_name}.json");
        let (old_nodes, old_indexes) = self.paths_for(&old_base);
        let (new_nodes, new_indexes) = self.paths_for(&new_base);
        if old_nodes.exists() {
            std::fs::rename(&old_nodes, &new_nodes).map_err(|source| IoError::Write {
                path: new_nodes.display().to_string(),
                source,
            })?;
        }
        if old_indexes.exists() {
            std::fs::rename(&old_indexes, &new_indexes).map_err(|source| IoError::Write {
                path: new_indexes.display().to_string(),
                source,
            })?;
        }
        self.registry.remove(old_name);
        self.registry.insert(new_name.to_string(), new_base);
        self.save_registry()?;
        log::info!("renamed database '{old_name}' to '{new_name}'");
        Ok(())
    }

    pub fn use_database(&self, name: &str) -> DBResult<Database> {
        let base = self.registry.get(name).cloned().ok_or_else(|| NotFoundError::Database(name.to_string()))?;
        let (nodes, indexes) = self.paths_for(&base);
        Ok(Database::open(nodes, indexes))
    }

    /// Copies the active database's companion files to `<backup_base>_nodes.json`
    /// / `<backup_base>_indexes.json`, refusing to overwrite an existing backup.
    pub fn backup_database(&self, name: &str, backup_base: &str) -> DBResult<()> {
        let base = self.registry.get(name).cloned().ok_or_else(|| NotFoundError::Database(name.to_string()))?;
        let (nodes, indexes) = self.paths_for(&base);
        if !nodes.exists() {
            return Err(ValidationError::Other(format!("nodes file '{}' not found", nodes.display())).into());
        }
        let backup_nodes = self.storage_dir.join(nodes_file(backup_base));
        let backup_indexes = self.storage_dir.join(indexes_file(backup_base));
        if backup_nodes.exists() || backup_indexes.exists() {
            return Err(ValidationError::Other("backup files already exist".to_string()).into());
        }
        std::fs::copy(&nodes, &backup_nodes)
            .map_err(|source| IoError::Write { path: backup_nodes.display().to_string(), source })?;
        if indexes.exists() {
            std::fs::copy(&indexes, &backup_indexes)
                .map_err(|source| IoError::Write { path: backup_indexes.display().to_string(), source })?;
        }
        log::info!("backed up database '{name}' to '{}' and '{}'", backup_nodes.display(), backup_indexes.display());
        Ok(())
    }

    /// Restores the companion files for `name` from `<backup_base>_*`, after
    /// validating both are well-formed JSON. Returns the freshly-reopened
    /// database so the caller can swap it in if it is the active one.
    pub fn restore_database(&self, name: &str, backup_base: &str) -> DBResult<Database> {
        let base = self.registry.get(name).cloned().ok_or_else(|| NotFoundError::Database(name.to_string()))?;
        let backup_nodes = self.storage_dir.join(nodes_file(backup_base));
        let backup_indexes = self.storage_dir.join(indexes_file(backup_base));
        if !backup_nodes.exists() {
            return Err(ValidationError::Other(format!("backup nodes file '{}' does not exist", backup_nodes.display())).into());
        }
        validate_json_file(&backup_nodes)?;
        if backup_indexes.exists() {
            validate_json_file(&backup_indexes)?;
        }
        let (nodes, indexes) = self.paths_for(&base);
        std::fs::copy(&backup_nodes, &nodes)
            .map_err(|source| IoError::Write { path: nodes.display().to_string(), source })?;
        if backup_indexes.exists() {
            std::fs::copy(&backup_indexes, &indexes)
                .map_err(|source| IoError::Write { path: indexes.display().to_string(), source })?;
        } else if indexes.exists() {
            let _ = std::fs::remove_file(&indexes);
        }
        log::info!("restored database '{name}' from backup");
        Ok(Database::open(nodes, indexes))
    }

    /// Copies the active database's companion files out to `<export_base>_*`,
    /// refusing to overwrite existing export files.
    pub fn export_database(&self, name: &str, export_base: &str) -> DBResult<()> {
        let base = self.registry.get(name).cloned().ok_or_else(|| NotFoundError::Database(name.to_string()))?;
        let (nodes, indexes) = self.paths_for(&base);
        if !nodes.exists() {
            return Err(ValidationError::Other(format!("nodes file '{}' not found", nodes.display())).into());
        }
        let export_nodes = self.storage_dir.join(nodes_file(export_base));
        let export_indexes = self.storage_dir.join(indexes_file(export_base));
        if export_nodes.exists() || export_indexes.exists() {
            return Err(ValidationError::Other("export files already exist".to_string()).into());
        }
        validate_json_file(&nodes)?;
        std::fs::copy(&nodes, &export_nodes)
            .map_err(|source| IoError::Write { path: export_nodes.display().to_string(), source })?;
        if indexes.exists() {
            std::fs::copy(&indexes, &export_indexes)
                .map_err(|source| IoError::Write { path: export_indexes.display().to_string(), source })?;
        }
        log::info!("exported database '{name}' to '{}' and '{}'", export_nodes.display(), export_indexes.display());
        Ok(())
    }

    /// Imports `<import_base>_nodes.json` (and `_indexes.json`, if present)
    /// into `name`, either overwriting its companion files outright or
    /// merging node-by-node / edge-by-edge / index-by-index into the
    /// existing state. Returns the reopened database.
    pub fn import_database(&self, name: &str, import_base: &str, merge: bool) -> DBResult<Database> {
        let base = self.registry.get(name).cloned().ok_or_else(|| NotFoundError::Database(name.to_string()))?;
        let import_nodes = self.storage_dir.join(nodes_file(import_base));
        let import_indexes = self.storage_dir.join(indexes_file(import_base));
        if !import_nodes.exists() {
            return Err(ValidationError::Other(format!("import nodes file '{}' does not exist", import_nodes.display())).into());
        }
        let imported_nodes = parse_import_nodes(&import_nodes)?;
        let imported_indexes = parse_import_indexes(&import_indexes)?;

        let (nodes, indexes) = self.paths_for(&base);
        if merge {
            let mut db = Database::open(nodes, indexes);
            for (id, (attrs, _)) in &imported_nodes {
                db.merge_vertex(*id, attrs.clone());
            }
            for (id, (_, edges)) in &imported_nodes {
                for (target, props) in edges {
                    db.link_both_if_present(*id, *target, props.clone());
                }
            }
            for (attr, value_map) in &imported_indexes {
                for (key, ids) in value_map {
                    db.union_index(attr, key, ids);
                }
            }
            db.save_public()?;
            log::info!("imported database '{name}' from '{}' with merge", import_nodes.display());
            Ok(db)
        } else {
            let nodes_out: HashMap<Uuid, Vertex> = imported_nodes
                .into_iter()
                .map(|(id, (attrs, edges))| (id, Vertex { value: attrs, edges }))
                .collect();
            let nodes_bytes = serde_json::to_vec_pretty(&nodes_out).expect("serializable");
            crate::storage::atomic_write(&nodes, &nodes_bytes)
                .map_err(|source| IoError::Write { path: nodes.display().to_string(), source })?;
            let indexes_bytes = serde_json::to_vec_pretty(&imported_indexes).expect("serializable");
            crate::storage::atomic_write(&indexes, &indexes_bytes)
                .map_err(|source| IoError::Write { path: indexes.display().to_string(), source })?;
            log::info!("imported database '{name}' from '{}'", import_nodes.display());
            Ok(Database::open(nodes, indexes))
        }
    }
}

fn validate_json_file(path: &Path) -> DBResult<()> {
    let bytes = std::fs::read(path).map_err(|source| IoError::Read { path: path.display().to_string(), source })?;
    serde_json::from_slice::<serde_json::Value>(&bytes)
        .map_err(|source| IoError::Json { path: path.display().to_string(), source })?;
    Ok(())
}

type ImportedVertex = (HashMap<String, Value>, HashMap<Uuid, EdgeProps>);

/// Parses an imported nodes file leniently, the way `kk.py`'s
/// `import_database` does: a node missing `value`/`edges` is rejected, but
/// an edge entry with an unrecognized or wrongly-typed property just has
/// that property dropped rather than failing the whole import.
fn parse_import_nodes(path: &Path) -> DBResult<HashMap<Uuid, ImportedVertex>> {
    let bytes = std::fs::read(path).map_err(|source| IoError::Read { path: path.display().to_string(), source })?;
    let raw: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|source| IoError::Json { path: path.display().to_string(), source })?;
    let obj = raw
        .as_object()
        .ok_or_else(|| ValidationError::Other("import nodes file must be a JSON object".to_string()))?;

    let mut out = HashMap::new();
    for (id_str, node) in obj {
        let id = Uuid::parse_str(id_str).map_err(|_| ValidationError::InvalidUuid(id_str.clone()))?;
        let node_obj = node
            .as_object()
            .ok_or_else(|| ValidationError::Other(format!("invalid node structure for id '{id_str}'")))?;
        let value_obj = node_obj
            .get("value")
            .and_then(|v| v.as_object())
            .ok_or_else(|| ValidationError::Other(format!("invalid value for node id '{id_str}'")))?;
        let attrs: HashMap<String, Value> = value_obj
            .iter()
            .filter_map(|(k, v)| serde_json::from_value::<Value>(v.clone()).ok().map(|v| (k.clone(), v)))
            .collect();

        let edges_obj = node_obj
            .get("edges")
            .and_then(|v| v.as_object())
            .ok_or_else(|| ValidationError::Other(format!("invalid edges for node id '{id_str}'")))?;
        let mut edges = HashMap::new();
        for (target_str, props) in edges_obj {
            let Ok(target) = Uuid::parse_str(target_str) else { continue };
            let Some(props_obj) = props.as_object() else { continue };
            let label = props_obj.get("label").map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            });
            let weight = props_obj.get("weight").and_then(|v| v.as_f64());
            edges.insert(target, EdgeProps::new(label, weight));
        }
        out.insert(id, (attrs, edges));
    }
    Ok(out)
}

fn parse_import_indexes(path: &Path) -> DBResult<HashMap<String, HashMap<String, Vec<Uuid>>>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let bytes = std::fs::read(path).map_err(|source| IoError::Read { path: path.display().to_string(), source })?;
    if bytes.is_empty() {
        return Ok(HashMap::new());
    }
    serde_json::from_slice(&bytes).map_err(|source| IoError::Json { path: path.display().to_string(), source }.into())
}
