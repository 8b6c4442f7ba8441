//! A bag of data returned by the Github API, addressed with dotted paths.
//!
//! `owner.login` walks into nested objects and numeric segments index into
//! arrays (`labels.0.name`). Entities do no schema validation: whatever Github
//! sent back is what gets stored.

use crate::client::{Auth, Error, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Key used in keyed collections for items that lack their natural key
pub const MISSING_KEY: &str = "false";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Entity {
    data: Map<String, Value>,
    auth: Auth,
}

impl Entity {
    /// Build an entity by `set`ting every top-level key in order, so a key
    /// like `"owner.login"` ends up nested.
    pub fn new(data: Map<String, Value>, auth: Auth) -> Self {
        let mut entity = Self {
            data: Map::new(),
            auth,
        };
        entity.merge(data);
        entity
    }

    /// Objects become entities; any other JSON value yields an empty entity.
    pub fn from_value(value: Value, auth: Auth) -> Self {
        match value {
            Value::Object(data) => Self::new(data, auth),
            _ => Self::new(Map::new(), auth),
        }
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.data.get(first)?;

        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        Some(current)
    }

    pub fn get_or(&self, path: &str, default: Value) -> Value {
        self.get(path).cloned().unwrap_or(default)
    }

    /// Like `get_or`, but the default is only computed on a miss
    pub fn get_or_else<F: FnOnce() -> Value>(&self, path: &str, default: F) -> Value {
        self.get(path).cloned().unwrap_or_else(default)
    }

    pub fn str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Store `value` at `path`, creating intermediate objects as needed. A
    /// scalar found part way down the path is replaced by an object.
    pub fn set<V: Into<Value>>(&mut self, path: &str, value: V) {
        let segments: Vec<&str> = path.split('.').collect();
        set_in(&mut self.data, &segments, value.into());
    }

    /// Remove the value at `path`, returning whether anything was removed
    pub fn unset(&mut self, path: &str) -> bool {
        let segments: Vec<&str> = path.split('.').collect();
        unset_in(&mut self.data, &segments)
    }

    /// Whether `path` holds a truthy value.
    ///
    /// Present-but-falsy values (`null`, `false`, `0`, `""`, `"0"`, `[]`, `{}`)
    /// report `false` exactly like absent ones.
    pub fn is_set(&self, path: &str) -> bool {
        self.get(path).map_or(false, is_truthy)
    }

    /// `set` every top-level key of `data`, keeping anything not mentioned
    pub fn merge(&mut self, data: Map<String, Value>) {
        for (property, value) in data {
            self.set(&property, value);
        }
    }

    /// Throw away the current data and rebuild from `data`
    pub fn replace(&mut self, data: Map<String, Value>) {
        self.data = Map::new();
        self.merge(data);
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn into_data(self) -> Map<String, Value> {
        self.data
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Fail with `Error::AuthRequired` unless this entity carries credentials
    pub fn require_auth(&self, operation: &'static str) -> Result<&Auth> {
        require_auth(&self.auth, operation)?;
        Ok(&self.auth)
    }

    /// Render a string or number at `path` for use inside a request path
    pub(crate) fn segment(&self, path: &'static str) -> Result<String> {
        self.get(path)
            .and_then(render_key)
            .ok_or(Error::MissingField(path))
    }
}

pub(crate) fn require_auth(auth: &Auth, operation: &'static str) -> Result<()> {
    if auth.is_none() {
        return Err(Error::AuthRequired { operation });
    }
    Ok(())
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn render_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Turn a JSON array response into a map keyed by each item's `field`.
///
/// Items without the field are stored under `MISSING_KEY`; later items win
/// when keys collide. Anything other than an array yields an empty map.
pub(crate) fn key_by<T, F>(list: Value, field: &str, mut wrap: F) -> BTreeMap<String, T>
where
    F: FnMut(Value) -> T,
{
    items(list)
        .into_iter()
        .map(|item| {
            let key = item
                .get(field)
                .and_then(render_key)
                .unwrap_or_else(|| MISSING_KEY.to_owned());
            (key, wrap(item))
        })
        .collect()
}

pub(crate) fn items(list: Value) -> Vec<Value> {
    match list {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

fn set_in(map: &mut Map<String, Value>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            map.insert((*last).to_owned(), value);
        }
        [first, rest @ ..] => {
            let slot = map.entry(*first).or_insert(Value::Null);
            set_in_value(slot, rest, value);
        }
    }
}

fn set_in_value(slot: &mut Value, segments: &[&str], value: Value) {
    let (first, rest) = match segments.split_first() {
        Some(split) => split,
        None => return,
    };

    if let Value::Array(items) = slot {
        match first.parse::<usize>() {
            Ok(index) if index < items.len() => {
                if rest.is_empty() {
                    items[index] = value;
                } else {
                    set_in_value(&mut items[index], rest, value);
                }
                return;
            }
            _ => {
                // Keep existing elements, keyed by their position
                let map = items
                    .drain(..)
                    .enumerate()
                    .map(|(index, item)| (index.to_string(), item))
                    .collect();
                *slot = Value::Object(map);
            }
        }
    }

    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }

    if let Value::Object(map) = slot {
        set_in(map, segments, value);
    }
}

fn unset_in(map: &mut Map<String, Value>, segments: &[&str]) -> bool {
    match segments {
        [] => false,
        [last] => map.remove(*last).is_some(),
        [first, rest @ ..] => match map.get_mut(*first) {
            Some(value) => unset_in_value(value, rest),
            None => false,
        },
    }
}

fn unset_in_value(value: &mut Value, segments: &[&str]) -> bool {
    match value {
        Value::Object(map) => unset_in(map, segments),
        Value::Array(items) => {
            let (first, rest) = match segments.split_first() {
                Some(split) => split,
                None => return false,
            };
            let index = match first.parse::<usize>() {
                Ok(index) if index < items.len() => index,
                _ => return false,
            };

            if rest.is_empty() {
                items.remove(index);
                true
            } else {
                unset_in_value(&mut items[index], rest)
            }
        }
        _ => false,
    }
}
