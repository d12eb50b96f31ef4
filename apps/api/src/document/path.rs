//! Canonical field paths: the dot/bracket address of a value inside a document.
//!
//! `basics.profiles[0].url` addresses the `url` of the first profile. The root
//! path has no segments and renders as the empty string. Paths are used both
//! as validation error keys and as the binding target of rendered controls.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

#[derive(Debug, Error, PartialEq)]
pub enum PathError {
    #[error("Malformed path '{0}'")]
    Malformed(String),

    #[error("Path '{path}' does not exist")]
    Missing { path: String },

    #[error("Path '{path}' crosses a {found} value")]
    NotAContainer { path: String, found: &'static str },

    #[error("Cannot replace the document root through a field path")]
    Root,

    #[error("Array entry '{0}' can only be removed with a confirmed remove")]
    EntryRemoval(String),
}

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.segments.push(PathSegment::Key(key.into()));
        next
    }

    pub fn index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.segments.push(PathSegment::Index(index));
        next
    }

    pub fn push_key(&mut self, key: impl Into<String>) {
        self.segments.push(PathSegment::Key(key.into()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.segments.push(PathSegment::Index(index));
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    pub fn parent(&self) -> Option<(FieldPath, &PathSegment)> {
        let (last, rest) = self.segments.split_last()?;
        Some((
            FieldPath {
                segments: rest.to_vec(),
            },
            last,
        ))
    }

    pub fn last_key(&self) -> Option<&str> {
        match self.segments.last() {
            Some(PathSegment::Key(k)) => Some(k),
            _ => None,
        }
    }

    /// True when `self` equals `prefix` or lies underneath it.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    pub fn get<'v>(&self, root: &'v Value) -> Option<&'v Value> {
        self.segments.iter().try_fold(root, |current, seg| match seg {
            PathSegment::Key(k) => current.as_object()?.get(k),
            PathSegment::Index(i) => current.as_array()?.get(*i),
        })
    }

    pub fn get_mut<'v>(&self, root: &'v mut Value) -> Option<&'v mut Value> {
        self.segments.iter().try_fold(root, |current, seg| match seg {
            PathSegment::Key(k) => current.as_object_mut()?.get_mut(k),
            PathSegment::Index(i) => current.as_array_mut()?.get_mut(*i),
        })
    }

    /// Writes `value` at this path, creating missing intermediate objects.
    /// Array indices must already exist; use array mutations to grow arrays.
    pub fn set(&self, root: &mut Value, value: Value) -> Result<(), PathError> {
        let Some((last, parents)) = self.segments.split_last() else {
            return Err(PathError::Root);
        };

        let mut current = root;
        for (depth, seg) in parents.iter().enumerate() {
            current = match seg {
                PathSegment::Key(k) => {
                    if current.is_null() {
                        *current = Value::Object(Map::new());
                    }
                    let found = type_name(current);
                    let obj = current.as_object_mut().ok_or_else(|| PathError::NotAContainer {
                        path: self.prefix(depth),
                        found,
                    })?;
                    obj.entry(k.clone())
                        .or_insert_with(|| Value::Object(Map::new()))
                }
                PathSegment::Index(i) => {
                    let found = type_name(current);
                    let arr = current.as_array_mut().ok_or_else(|| PathError::NotAContainer {
                        path: self.prefix(depth),
                        found,
                    })?;
                    arr.get_mut(*i).ok_or_else(|| PathError::Missing {
                        path: self.prefix(depth + 1),
                    })?
                }
            };
        }

        match last {
            PathSegment::Key(k) => {
                if current.is_null() {
                    *current = Value::Object(Map::new());
                }
                let found = type_name(current);
                let obj = current.as_object_mut().ok_or_else(|| PathError::NotAContainer {
                    path: self.prefix(parents.len()),
                    found,
                })?;
                obj.insert(k.clone(), value);
            }
            PathSegment::Index(i) => {
                let found = type_name(current);
                let arr = current.as_array_mut().ok_or_else(|| PathError::NotAContainer {
                    path: self.prefix(parents.len()),
                    found,
                })?;
                let slot = arr.get_mut(*i).ok_or_else(|| PathError::Missing {
                    path: self.to_string(),
                })?;
                *slot = value;
            }
        }
        Ok(())
    }

    /// Removes the value at this path. Removing an absent object key is a no-op.
    pub fn remove(&self, root: &mut Value) -> Result<Option<Value>, PathError> {
        let Some((parent, last)) = self.parent() else {
            return Err(PathError::Root);
        };
        let Some(container) = parent.get_mut(root) else {
            return Ok(None);
        };
        match (last, container) {
            (PathSegment::Key(k), Value::Object(obj)) => Ok(obj.shift_remove(k)),
            (PathSegment::Index(i), Value::Array(arr)) if *i < arr.len() => Ok(Some(arr.remove(*i))),
            (PathSegment::Index(_), Value::Array(_)) => Err(PathError::Missing {
                path: self.to_string(),
            }),
            (_, other) => Err(PathError::NotAContainer {
                path: parent.to_string(),
                found: type_name(other),
            }),
        }
    }

    fn prefix(&self, len: usize) -> String {
        FieldPath {
            segments: self.segments[..len].to_vec(),
        }
        .to_string()
    }
}

/// JSON type names as they appear in validation messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            match seg {
                PathSegment::Key(k) if i == 0 => write!(f, "{k}")?,
                PathSegment::Key(k) => write!(f, ".{k}")?,
                PathSegment::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PathError::Malformed(s.to_string());
        let mut path = FieldPath::root();
        if s.is_empty() {
            return Ok(path);
        }

        let mut rest = s;
        let mut expect_key = true;
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('[') {
                let close = after.find(']').ok_or_else(malformed)?;
                let index = after[..close].parse::<usize>().map_err(|_| malformed())?;
                path.push_index(index);
                rest = &after[close + 1..];
                expect_key = false;
                continue;
            }
            if !expect_key {
                rest = rest.strip_prefix('.').ok_or_else(malformed)?;
            }
            let end = rest.find(['.', '[']).unwrap_or(rest.len());
            if end == 0 {
                return Err(malformed());
            }
            path.push_key(&rest[..end]);
            rest = &rest[end..];
            expect_key = false;
        }
        Ok(path)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_uses_dots_and_brackets() {
        let path = FieldPath::root().key("basics").key("profiles").index(0).key("url");
        assert_eq!(path.to_string(), "basics.profiles[0].url");
        assert_eq!(FieldPath::root().to_string(), "");
    }

    #[test]
    fn test_parse_round_trips_display() {
        for raw in ["basics.name", "work[2].highlights[0]", "skills", ""] {
            let parsed: FieldPath = raw.parse().unwrap();
            assert_eq!(parsed.to_string(), raw);
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("work[x]".parse::<FieldPath>().is_err());
        assert!("basics..name".parse::<FieldPath>().is_err());
        assert!("work[0]name".parse::<FieldPath>().is_err());
    }

    #[test]
    fn test_get_and_set_nested() {
        let mut doc = json!({"basics": {"name": "A"}, "work": [{"company": "X"}]});
        let city = FieldPath::root().key("basics").key("location").key("city");
        city.set(&mut doc, json!("Oslo")).unwrap();
        assert_eq!(city.get(&doc), Some(&json!("Oslo")));

        let company: FieldPath = "work[0].company".parse().unwrap();
        company.set(&mut doc, json!("Y")).unwrap();
        assert_eq!(doc["work"][0]["company"], json!("Y"));
    }

    #[test]
    fn test_set_out_of_range_index_fails() {
        let mut doc = json!({"work": []});
        let path: FieldPath = "work[3].company".parse().unwrap();
        assert!(matches!(
            path.set(&mut doc, json!("Z")),
            Err(PathError::Missing { .. })
        ));
    }

    #[test]
    fn test_remove_key_keeps_siblings() {
        let mut doc = json!({"basics": {"name": "A", "label": "B"}});
        let label: FieldPath = "basics.label".parse().unwrap();
        assert_eq!(label.remove(&mut doc).unwrap(), Some(json!("B")));
        assert_eq!(doc, json!({"basics": {"name": "A"}}));
        assert_eq!(label.remove(&mut doc).unwrap(), None);
    }

    #[test]
    fn test_starts_with() {
        let row: FieldPath = "work[1]".parse().unwrap();
        let cell: FieldPath = "work[1].company".parse().unwrap();
        assert!(cell.starts_with(&row));
        assert!(!row.starts_with(&cell));
    }
}
