//! Index manager: value-key -> vertex-id-set maps, one per indexed
//! attribute. Grounded on `ADBMS/kk.py`'s `create_index`/`drop_index`/
//! `_update_index` and the teacher's `src/graph/index.rs` `PropertyIndex`
//! (nested `HashMap<String, HashMap<Value, HashSet<Value>>>` shape).

use crate::error::ValidationError;
use crate::model::Vertex;
use crate::value::Value;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// `attr -> (value-key -> vertex ids)`.
#[derive(Debug, Clone, Default)]
pub struct IndexManager {
    indexes: HashMap<String, HashMap<String, HashSet<Uuid>>>,
}

impl IndexManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_indexed(&self, attr: &str) -> bool {
        self.indexes.contains_key(attr)
    }

    pub fn list_indexes(&self) -> Vec<String> {
        self.indexes.keys().cloned().collect()
    }

    /// Builds the index by walking every vertex once. Fails if `attr` is
    /// already indexed.
    pub fn create_index(
        &mut self,
        attr: &str,
        vertices: &HashMap<Uuid, Vertex>,
    ) -> Result<(), ValidationError> {
        if self.indexes.contains_key(attr) {
            return Err(ValidationError::IndexAlreadyExists(attr.to_string()));
        }
        let mut map: HashMap<String, HashSet<Uuid>> = HashMap::new();
        for (id, vertex) in vertices {
            if let Some(value) = vertex.value.get(attr) {
                map.entry(value.stringify()).or_default().insert(*id);
            }
        }
        self.indexes.insert(attr.to_string(), map);
        Ok(())
    }

    pub fn drop_index(&mut self, attr: &str) -> Result<(), ValidationError> {
        if self.indexes.remove(attr).is_none() {
            return Err(ValidationError::IndexNotFound(attr.to_string()));
        }
        Ok(())
    }

    /// Moves `id` from the key for `old` to the key for `new` in the index
    /// on `attr`, if one exists. Either value may be absent (attribute
    /// added or removed by an update).
    pub fn update_index(
        &mut self,
        attr: &str,
        id: Uuid,
        old: Option<&Value>,
        new: Option<&Value>,
    ) {
        let Some(map) = self.indexes.get_mut(attr) else {
            return;
        };
        if let Some(old) = old {
            let key = old.stringify();
            if let Some(set) = map.get_mut(&key) {
                set.remove(&id);
                if set.is_empty() {
                    map.remove(&key);
                }
            }
        }
        if let Some(new) = new {
            map.entry(new.stringify()).or_default().insert(id);
        }
    }

    /// Removes `id` from every index entry under `attr` for its current
    /// `value` (used when a vertex is deleted).
    pub fn remove_from_index(&mut self, attr: &str, id: Uuid, value: &Value) {
        let Some(map) = self.indexes.get_mut(attr) else {
            return;
        };
        let key = value.stringify();
        if let Some(set) = map.get_mut(&key) {
            set.remove(&id);
            if set.is_empty() {
                map.remove(&key);
            }
        }
    }

    pub fn equals(&self, attr: &str, key: &str) -> Option<&HashSet<Uuid>> {
        self.indexes.get(attr).and_then(|m| m.get(key))
    }

    pub fn in_set(&self, attr: &str, keys: &[String]) -> Option<HashSet<Uuid>> {
        let map = self.indexes.get(attr)?;
        let mut out = HashSet::new();
        for key in keys {
            if let Some(set) = map.get(key) {
                out.extend(set.iter().copied());
            }
        }
        Some(out)
    }

    /// Loads from the `<base>_indexes.json` on-disk shape, where sets are
    /// serialized as arrays.
    pub fn hydrate(&mut self, raw: HashMap<String, HashMap<String, Vec<Uuid>>>) {
        self.indexes = raw
            .into_iter()
            .map(|(attr, value_map)| {
                let value_map = value_map
                    .into_iter()
                    .map(|(key, ids)| (key, ids.into_iter().collect::<HashSet<_>>()))
                    .collect();
                (attr, value_map)
            })
            .collect();
    }

    /// Converts to the on-disk shape, re-serializing sets as arrays.
    pub fn dehydrate(&self) -> HashMap<String, HashMap<String, Vec<Uuid>>> {
        self.indexes
            .iter()
            .map(|(attr, value_map)| {
                let value_map = value_map
                    .iter()
                    .map(|(key, ids)| (key.clone(), ids.iter().copied().collect()))
                    .collect();
                (attr.clone(), value_map)
            })
            .collect()
    }

    /// Unions `ids` into the set at `attr`/`key`, creating either level of
    /// the map if it did not exist. Used by import-merge (`spec.md` §4.E).
    pub fn union_raw(&mut self, attr: &str, key: &str, ids: &[Uuid]) {
        self.indexes
            .entry(attr.to_string())
            .or_default()
            .entry(key.to_string())
            .or_default()
            .extend(ids.iter().copied());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(attr: &str, value: Value) -> Vertex {
        let mut v = Vertex::new(HashMap::new());
        v.value.insert(attr.to_string(), value);
        v
    }

    #[test]
    fn create_index_back_fills_existing_vertices() {
        let mut vertices = HashMap::new();
        let id1 = Uuid::new_v4();
        let id2 = Uuid::new_v4();
        vertices.insert(id1, vertex("age", Value::Int(30)));
        vertices.insert(id2, vertex("age", Value::Int(30)));

        let mut idx = IndexManager::new();
        idx.create_index("age", &vertices).unwrap();
        let set = idx.equals("age", "30").unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn create_index_twice_fails() {
        let vertices = HashMap::new();
        let mut idx = IndexManager::new();
        idx.create_index("age", &vertices).unwrap();
        assert!(idx.create_index("age", &vertices).is_err());
    }

    #[test]
    fn update_index_moves_and_prunes_empty_keys() {
        let vertices = HashMap::new();
        let mut idx = IndexManager::new();
        idx.create_index("age", &vertices).unwrap();
        let id = Uuid::new_v4();
        idx.update_index("age", id, None, Some(&Value::Int(30)));
        assert!(idx.equals("age", "30").is_some());
        idx.update_index("age", id, Some(&Value::Int(30)), Some(&Value::Int(31)));
        assert!(idx.equals("age", "30").is_none());
        assert_eq!(idx.equals("age", "31").unwrap().len(), 1);
    }
}
