//! In-memory vertex/edge storage with JSON persistence to a pair of
//! companion files, plus the transaction snapshot stack. Grounded on
//! `ADBMS/kk.py`'s `GraphDatabase` class, method for method.

use super::fs_util::atomic_write;
use super::index::IndexManager;
use super::transaction::TransactionManager;
use crate::error::{DBError, DBResult, NotFoundError, ValidationError};
use crate::model::{EdgeProps, Vertex};
use crate::value::Value;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use uuid::Uuid;

/// Whole-database pre-image pushed onto the transaction stack. Deep-copying
/// both maps together is what keeps a rollback from desyncing vertices from
/// indexes (`spec.md` §9 "Deep-copy snapshots").
#[derive(Clone)]
struct Snapshot {
    vertices: HashMap<Uuid, Vertex>,
    indexes: IndexManager,
}

/// On-disk shape of `<base>_indexes.json`: value-sets serialize as arrays
/// and are re-hydrated to sets on load.
type IndexesFile = HashMap<String, HashMap<String, Vec<Uuid>>>;

pub struct Database {
    vertices: HashMap<Uuid, Vertex>,
    indexes: IndexManager,
    tx: TransactionManager<Snapshot>,
    nodes_path: PathBuf,
    indexes_path: PathBuf,
}

impl Database {
    /// Opens (or creates) the companion files at `nodes_path`/
    /// `indexes_path`. A missing or unparseable file is replaced with
    /// empty state and a warning is logged — never a fatal error, per
    /// `spec.md` §4.A.
    pub fn open(nodes_path: PathBuf, indexes_path: PathBuf) -> Self {
        let vertices = Self::load_nodes(&nodes_path);
        let indexes = Self::load_indexes(&indexes_path);
        Database {
            vertices,
            indexes,
            tx: TransactionManager::new(),
            nodes_path,
            indexes_path,
        }
    }

    fn load_nodes(path: &PathBuf) -> HashMap<Uuid, Vertex> {
        match std::fs::read(path) {
            Ok(bytes) if !bytes.is_empty() => match serde_json::from_slice(&bytes) {
                Ok(v) => v,
                Err(e) => {
                    log::warn!(
                        "invalid JSON in {}: {e}; starting with an empty node map",
                        path.display()
                    );
                    HashMap::new()
                }
            },
            _ => HashMap::new(),
        }
    }

    fn load_indexes(path: &PathBuf) -> IndexManager {
        match std::fs::read(path) {
            Ok(bytes) if !bytes.is_empty() => match serde_json::from_slice::<IndexesFile>(&bytes)
            {
                Ok(raw) => {
                    let mut idx = IndexManager::new();
                    idx.hydrate(raw);
                    idx
                }
                Err(e) => {
                    log::warn!(
                        "invalid JSON in {}: {e}; starting with empty indexes",
                        path.display()
                    );
                    IndexManager::new()
                }
            },
            _ => IndexManager::new(),
        }
    }

    fn save_nodes(&self) -> DBResult<()> {
        let bytes = serde_json::to_vec_pretty(&self.vertices).expect("Vertex is serializable");
        atomic_write(&self.nodes_path, &bytes).map_err(|source| {
            DBError::Io(crate::error::IoError::Write {
                path: self.nodes_path.display().to_string(),
                source,
            })
        })
    }

    fn save_indexes(&self) -> DBResult<()> {
        let raw = self.indexes.dehydrate();
        let bytes = serde_json::to_vec_pretty(&raw).expect("index map is serializable");
        atomic_write(&self.indexes_path, &bytes).map_err(|source| {
            DBError::Io(crate::error::IoError::Write {
                path: self.indexes_path.display().to_string(),
                source,
            })
        })
    }

    fn save(&self) -> DBResult<()> {
        self.save_nodes()?;
        self.save_indexes()
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            vertices: self.vertices.clone(),
            indexes: self.indexes.clone(),
        }
    }

    fn maybe_snapshot(&mut self) {
        let snap = self.snapshot();
        self.tx.snapshot_if_active(|| snap);
    }

    fn validate_attrs(value: &HashMap<String, Value>) -> Result<(), ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::EmptyAttributes);
        }
        Ok(())
    }

    fn warn_on_suspicious_attrs(value: &HashMap<String, Value>) {
        for key in value.keys() {
            let lower = key.to_lowercase();
            if lower.starts_with("na") && lower != "name" {
                log::warn!("attribute '{key}' is unusual — did you mean 'name'?");
            }
        }
    }

    fn warn_on_duplicate_name(&self, name: &Value, exclude: Option<Uuid>) {
        if let Value::String(name) = name {
            let dup = self.vertices.iter().any(|(id, v)| {
                exclude != Some(*id) && matches!(v.value.get("name"), Some(Value::String(n)) if n == name)
            });
            if dup {
                log::warn!("a vertex with name '{name}' already exists");
            }
        }
    }

    // ---- public operations, grounded on kk.py's GraphDatabase methods ----

    pub fn add_node(&mut self, value: HashMap<String, Value>) -> DBResult<Uuid> {
        Self::validate_attrs(&value)?;
        if let Some(name) = value.get("name") {
            self.warn_on_duplicate_name(name, None);
        }
        Self::warn_on_suspicious_attrs(&value);

        self.maybe_snapshot();
        let id = Uuid::new_v4();
        for (attr, v) in &value {
            if self.indexes.is_indexed(attr) {
                self.indexes.update_index(attr, id, None, Some(v));
            }
        }
        self.vertices.insert(id, Vertex::new(value));
        self.save()?;
        Ok(id)
    }

    pub fn update_node(&mut self, id: Uuid, partial: HashMap<String, Value>) -> DBResult<()> {
        if !self.vertices.contains_key(&id) {
            return Err(NotFoundError::Vertex(id).into());
        }
        if partial.is_empty() {
            return Err(ValidationError::EmptyAttributes.into());
        }
        if let Some(name) = partial.get("name") {
            self.warn_on_duplicate_name(name, Some(id));
        }
        Self::warn_on_suspicious_attrs(&partial);

        self.maybe_snapshot();
        let vertex = self.vertices.get_mut(&id).expect("checked above");
        for (attr, new_val) in &partial {
            let old_val = vertex.value.get(attr);
            if self.indexes.is_indexed(attr) && old_val != Some(new_val) {
                self.indexes.update_index(attr, id, old_val, Some(new_val));
            }
        }
        vertex.value.extend(partial);
        self.save()?;
        Ok(())
    }

    pub fn delete_node(&mut self, id: Uuid) -> DBResult<()> {
        if !self.vertices.contains_key(&id) {
            return Err(NotFoundError::Vertex(id).into());
        }
        self.maybe_snapshot();
        let vertex = self.vertices.remove(&id).expect("checked above");
        for attr in self.indexes.list_indexes() {
            if let Some(value) = vertex.value.get(&attr) {
                self.indexes.remove_from_index(&attr, id, value);
            }
        }
        for neighbor in vertex.edges.keys() {
            if let Some(n) = self.vertices.get_mut(neighbor) {
                n.edges.remove(&id);
            }
        }
        self.save()?;
        Ok(())
    }

    pub fn add_edge(
        &mut self,
        a: Uuid,
        b: Uuid,
        label: Option<String>,
        weight: Option<f64>,
    ) -> DBResult<()> {
        if !self.vertices.contains_key(&a) {
            return Err(NotFoundError::Vertex(a).into());
        }
        if !self.vertices.contains_key(&b) {
            return Err(NotFoundError::Vertex(b).into());
        }
        if a == b {
            return Err(ValidationError::SelfLoop.into());
        }
        if self.vertices[&a].edges.contains_key(&b) {
            return Err(ValidationError::DuplicateEdge(a, b).into());
        }
        self.maybe_snapshot();
        let props = EdgeProps::new(label, weight);
        self.vertices.get_mut(&a).unwrap().edges.insert(b, props.clone());
        self.vertices.get_mut(&b).unwrap().edges.insert(a, props);
        self.save()?;
        Ok(())
    }

    pub fn delete_edge(&mut self, a: Uuid, b: Uuid) -> DBResult<()> {
        if !self.vertices.contains_key(&a) {
            return Err(NotFoundError::Vertex(a).into());
        }
        if !self.vertices.contains_key(&b) {
            return Err(NotFoundError::Vertex(b).into());
        }
        if !self.vertices[&a].edges.contains_key(&b) {
            return Err(NotFoundError::Edge(a, b).into());
        }
        self.maybe_snapshot();
        self.vertices.get_mut(&a).unwrap().edges.remove(&b);
        self.vertices.get_mut(&b).unwrap().edges.remove(&a);
        self.save()?;
        Ok(())
    }

    pub fn get_value(&self, id: Uuid) -> HashMap<String, Value> {
        self.vertices
            .get(&id)
            .map(|v| v.value.clone())
            .unwrap_or_default()
    }

    pub fn list_all_nodes(&self) -> HashMap<Uuid, HashMap<String, Value>> {
        self.vertices
            .iter()
            .map(|(id, v)| (*id, v.value.clone()))
            .collect()
    }

    pub fn get_edges(&self, id: Uuid) -> HashMap<Uuid, EdgeProps> {
        self.vertices.get(&id).map(|v| v.edges.clone()).unwrap_or_default()
    }

    /// Exact index match when `name` is indexed, otherwise a
    /// case-insensitive substring scan — the two behaviors are
    /// intentionally different (`spec.md` §4.A).
    pub fn find_by_name(&self, query: &str) -> Vec<Uuid> {
        if self.indexes.is_indexed("name") {
            return self
                .indexes
                .equals("name", query)
                .map(|set| set.iter().copied().collect())
                .unwrap_or_default();
        }
        let needle = query.to_lowercase();
        self.vertices
            .iter()
            .filter_map(|(id, v)| match v.value.get("name") {
                Some(Value::String(name)) if name.to_lowercase().contains(&needle) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Breadth-first search over the undirected adjacency; returns the
    /// first discovered shortest path, inclusive of both endpoints.
    pub fn find_path(&self, start: Uuid, end: Uuid) -> DBResult<Option<Vec<Uuid>>> {
        if !self.vertices.contains_key(&start) {
            return Err(NotFoundError::Vertex(start).into());
        }
        if !self.vertices.contains_key(&end) {
            return Err(NotFoundError::Vertex(end).into());
        }
        if start == end {
            return Ok(Some(vec![start]));
        }
        let mut visited = std::collections::HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(vec![start]);
        visited.insert(start);
        while let Some(path) = queue.pop_front() {
            let current = *path.last().unwrap();
            if current == end {
                return Ok(Some(path));
            }
            if let Some(vertex) = self.vertices.get(&current) {
                for neighbor in vertex.edges.keys() {
                    if visited.insert(*neighbor) {
                        let mut next = path.clone();
                        next.push(*neighbor);
                        queue.push_back(next);
                    }
                }
            }
        }
        Ok(None)
    }

    // ---- index management ----

    pub fn create_index(&mut self, attr: &str) -> DBResult<()> {
        self.indexes.create_index(attr, &self.vertices)?;
        self.save()?;
        Ok(())
    }

    pub fn drop_index(&mut self, attr: &str) -> DBResult<()> {
        self.indexes.drop_index(attr)?;
        self.save()?;
        Ok(())
    }

    pub fn list_indexes(&self) -> Vec<String> {
        self.indexes.list_indexes()
    }

    pub(crate) fn vertices(&self) -> &HashMap<Uuid, Vertex> {
        &self.vertices
    }

    pub(crate) fn indexes(&self) -> &IndexManager {
        &self.indexes
    }

    // ---- transactions ----

    pub fn begin(&mut self) -> DBResult<()> {
        self.tx.begin()?;
        Ok(())
    }

    pub fn commit(&mut self) -> DBResult<()> {
        self.tx.commit()?;
        Ok(())
    }

    /// Restores exactly the state that existed before the most recent
    /// mutation. A no-op (not an error) when there is nothing to undo.
    pub fn rollback(&mut self) -> DBResult<()> {
        if let Some(snap) = self.tx.rollback()? {
            self.vertices = snap.vertices;
            self.indexes = snap.indexes;
            self.save()?;
        } else {
            log::info!("nothing to roll back: no changes made in this transaction");
        }
        Ok(())
    }

    pub fn stop(&mut self) -> DBResult<()> {
        self.tx.stop()?;
        Ok(())
    }

    // ---- import/export support (see Catalog) ----

    pub(crate) fn merge_vertex(&mut self, id: Uuid, attrs: HashMap<String, Value>) {
        match self.vertices.get_mut(&id) {
            Some(v) => v.value.extend(attrs),
            None => {
                self.vertices.insert(id, Vertex::new(attrs));
            }
        }
    }

    /// Writes `props` symmetrically on both sides of `a`/`b`, the way
    /// `kk.py`'s merge-import does (kk.py:297-301) — only when *both*
    /// endpoints already exist in the merged store. Never fabricates a
    /// vertex: a dangling edge target in the imported file is silently
    /// skipped, matching `kk.py`'s `if target_id in current_db.db["nodes"]`.
    pub(crate) fn link_both_if_present(&mut self, a: Uuid, b: Uuid, props: EdgeProps) {
        if self.vertices.contains_key(&a) && self.vertices.contains_key(&b) {
            self.vertices.get_mut(&a).unwrap().edges.insert(b, props.clone());
            self.vertices.get_mut(&b).unwrap().edges.insert(a, props);
        }
    }

    pub(crate) fn union_index(&mut self, attr: &str, key: &str, ids: &[Uuid]) {
        self.indexes.union_raw(attr, key, ids);
    }

    pub(crate) fn save_public(&self) -> DBResult<()> {
        self.save()
    }
}
