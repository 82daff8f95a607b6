use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Ordered, string-keyed connection parameters for a datastore.
///
/// Keys are unique and the last write wins. Insertion order is kept so the
/// serialized `entry` list is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterStore {
    entries: Vec<(String, String)>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the value stored under `key`.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key.to_owned(), value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParameterStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (k, v) in iter {
            let key: String = k.into();
            store.set(&key, v);
        }
        store
    }
}

/// A single `{"@key": ..., "$": ...}` element of the REST `entry` list.
#[derive(Debug, Serialize, Deserialize)]
struct Entry {
    #[serde(rename = "@key")]
    key: String,
    #[serde(rename = "$", default)]
    value: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Entries {
    Many(Vec<Entry>),
    One(Entry),
}

#[derive(Serialize)]
struct EntryListRef<'a> {
    entry: Vec<EntryRef<'a>>,
}

#[derive(Serialize)]
struct EntryRef<'a> {
    #[serde(rename = "@key")]
    key: &'a str,
    #[serde(rename = "$")]
    value: &'a str,
}

#[derive(Deserialize)]
struct EntryList {
    #[serde(default)]
    entry: Option<Entries>,
}

impl Serialize for ParameterStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EntryListRef {
            entry: self
                .iter()
                .map(|(key, value)| EntryRef { key, value })
                .collect(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ParameterStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let list = EntryList::deserialize(deserializer)?;
        let entries = match list.entry {
            Some(Entries::Many(v)) => v,
            Some(Entries::One(e)) => vec![e],
            None => Vec::new(),
        };
        Ok(entries.into_iter().map(|e| (e.key, e.value)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_existing_key() {
        let mut params = ParameterStore::new();
        params.set("host", "db1");
        params.set("host", "db2");
        assert_eq!(params.get("host"), Some("db2"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn get_unknown_key_is_none() {
        let params = ParameterStore::new();
        assert_eq!(params.get("missing"), None);
        assert!(!params.contains("missing"));
        assert!(params.is_empty());
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut params = ParameterStore::new();
        params.set("b", "1");
        params.set("a", "2");
        params.set("b", "3");
        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn serializes_as_entry_list() {
        let params: ParameterStore = [("dbtype", "postgis"), ("port", "5432")]
            .into_iter()
            .collect();
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"entry": [
                {"@key": "dbtype", "$": "postgis"},
                {"@key": "port", "$": "5432"},
            ]})
        );
    }

    #[test]
    fn deserializes_single_entry_object() {
        let params: ParameterStore =
            serde_json::from_str(r#"{"entry": {"@key": "database", "$": "roads"}}"#).unwrap();
        assert_eq!(params.get("database"), Some("roads"));
    }

    #[test]
    fn deserializes_missing_entry_as_empty() {
        let params: ParameterStore = serde_json::from_str("{}").unwrap();
        assert!(params.is_empty());
    }
}
