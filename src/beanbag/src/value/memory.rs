use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::value::{Value, ValueStore};

/// An in-memory [`ValueStore`], the default store of every container.
///
/// A dotted key addresses nested maps: setting `db.prefix` creates the map
/// `db` when needed, replacing any non-map value found on the way.
#[derive(Debug, Default)]
pub struct MemoryValueStore {
    layers: RwLock<Layers>,
}

#[derive(Debug, Default)]
struct Layers {
    defaults: BTreeMap<String, Value>,
    values: BTreeMap<String, Value>,
}

impl MemoryValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ValueStore for MemoryValueStore {
    fn set_default(&self, key: &str, value: Value) {
        insert_path(&mut self.layers.write().defaults, key, value);
    }

    fn set(&self, key: &str, value: Value) {
        insert_path(&mut self.layers.write().values, key, value);
    }

    fn get(&self, key: &str) -> Option<Value> {
        let layers = self.layers.read();
        if scalar_on_path(&layers.values, key) {
            return None;
        }
        match (get_path(&layers.values, key), get_path(&layers.defaults, key)) {
            (Some(Value::Map(value)), Some(Value::Map(default))) => {
                let mut merged = default.clone();
                merge(&mut merged, value.clone());
                Some(Value::Map(merged))
            }
            (Some(value), _) => Some(value.clone()),
            (None, default) => default.cloned(),
        }
    }

    fn get_all(&self) -> BTreeMap<String, Value> {
        let layers = self.layers.read();
        let mut all = layers.defaults.clone();
        merge(&mut all, layers.values.clone());
        all
    }
}

fn insert_path(root: &mut BTreeMap<String, Value>, key: &str, value: Value) {
    let mut segments: Vec<&str> = key.split('.').collect();
    let Some(last) = segments.pop() else {
        return;
    };

    let mut map = root;
    for segment in segments {
        let entry = map
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Map(BTreeMap::new()));
        if !matches!(entry, Value::Map(_)) {
            *entry = Value::Map(BTreeMap::new());
        }
        let Value::Map(inner) = entry else {
            unreachable!("`entry` should already be a map")
        };
        map = inner;
    }
    map.insert(last.to_owned(), value);
}

fn get_path<'a>(root: &'a BTreeMap<String, Value>, key: &str) -> Option<&'a Value> {
    let mut segments = key.split('.');
    let mut current = root.get(segments.next()?)?;
    for segment in segments {
        current = current.as_map()?.get(segment)?;
    }
    Some(current)
}

/// Tells whether a non-map value sits on a strict prefix of `key`, hiding
/// everything below it.
fn scalar_on_path(root: &BTreeMap<String, Value>, key: &str) -> bool {
    let mut segments: Vec<&str> = key.split('.').collect();
    segments.pop();

    let mut map = root;
    for segment in segments {
        match map.get(segment) {
            Some(Value::Map(inner)) => map = inner,
            Some(_) => return true,
            None => return false,
        }
    }
    false
}

fn merge(base: &mut BTreeMap<String, Value>, overlay: BTreeMap<String, Value>) {
    for (key, value) in overlay {
        match value {
            Value::Map(overlay) => match base.get_mut(&key) {
                Some(Value::Map(nested)) => merge(nested, overlay),
                _ => {
                    base.insert(key, Value::Map(overlay));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_value_store_get_succeeds_with_nested_keys() {
        let store = MemoryValueStore::new();
        store.set("db.prefix", "t_".into());
        store.set("db.pool.size", 8.into());

        assert_eq!(store.get("db.prefix"), Some(Value::from("t_")));
        assert_eq!(store.get("db.pool.size").and_then(|v| v.as_i64()), Some(8));
        assert!(store.get("db").unwrap().as_map().unwrap().contains_key("pool"));
        assert_eq!(store.get("db.missing"), None);
        assert_eq!(store.get("db.prefix.deeper"), None);
    }

    #[test]
    fn memory_value_store_values_shadow_defaults() {
        let store = MemoryValueStore::new();
        store.set_default("server.port", 8080.into());
        store.set_default("server.host", "localhost".into());
        store.set("server.port", 9090.into());

        assert_eq!(store.get("server.port"), Some(Value::Int(9090)));
        assert_eq!(store.get("server.host"), Some(Value::from("localhost")));

        let server = store.get("server").unwrap();
        let server = server.as_map().unwrap();
        assert_eq!(server.get("port"), Some(&Value::Int(9090)));
        assert_eq!(server.get("host"), Some(&Value::from("localhost")));
    }

    #[test]
    fn memory_value_store_get_all_merges_layers() {
        let store = MemoryValueStore::new();
        store.set_default("app.name", "demo".into());
        store.set_default("debug", false.into());
        store.set("app.tags", vec!["a", "b"].into());
        store.set("debug", true.into());

        let all = store.get_all();
        assert_eq!(all.get("debug"), Some(&Value::Bool(true)));
        let app = all.get("app").unwrap().as_map().unwrap();
        assert_eq!(app.get("name"), Some(&Value::from("demo")));
        assert_eq!(
            app.get("tags").and_then(Value::as_list).map(<[Value]>::len),
            Some(2)
        );
    }

    #[test]
    fn memory_value_store_set_replaces_scalar_on_path() {
        let store = MemoryValueStore::new();
        store.set("cache", "disabled".into());
        store.set("cache.ttl", 60.into());

        assert_eq!(store.get("cache.ttl"), Some(Value::Int(60)));
    }

    #[test]
    fn memory_value_store_scalar_value_shadows_default_subtree() {
        let store = MemoryValueStore::new();
        store.set_default("db.prefix", "t_".into());
        store.set("db", "disabled".into());

        assert_eq!(store.get("db.prefix"), None);
        assert_eq!(store.get("db"), Some(Value::from("disabled")));
        assert_eq!(store.get_all().get("db"), Some(&Value::from("disabled")));
    }
}
