//! JSON patch (RFC 6902) operations

use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

/// One patch operation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Operation {
    Add { path: String, value: Value },
    Remove { path: String },
    Replace { path: String, value: Value },
    Move { from: String, path: String },
    Copy { from: String, path: String },
    Test { path: String, value: Value },
}

/// Parse a YAML or JSON list of operations.
pub fn parse_operations(bytes: &[u8]) -> Result<Vec<Operation>> {
    Ok(serde_yaml::from_slice(bytes)?)
}

/// Apply every operation, or none of them.
pub fn apply(document: &mut Value, operations: &[Operation]) -> Result<()> {
    let mut working = document.clone();
    for operation in operations {
        apply_one(&mut working, operation)?;
    }
    *document = working;
    Ok(())
}

fn apply_one(doc: &mut Value, operation: &Operation) -> Result<()> {
    match operation {
        Operation::Add { path, value } => add(doc, path, value.clone()),
        Operation::Remove { path } => remove(doc, path).map(drop),
        Operation::Replace { path, value } => {
            let target = pointer_mut(doc, path)?;
            *target = value.clone();
            Ok(())
        }
        Operation::Move { from, path } => {
            if path.starts_with(&format!("{from}/")) {
                return Err(Error::patch(format!("cannot move {from} into its own child {path}")));
            }
            let value = remove(doc, from)?;
            add(doc, path, value)
        }
        Operation::Copy { from, path } => {
            let value = pointer(doc, from)?.clone();
            add(doc, path, value)
        }
        Operation::Test { path, value } => {
            let actual = pointer(doc, path)?;
            if actual == value {
                Ok(())
            } else {
                Err(Error::patch(format!("test failed at {path}: expected {value}, found {actual}")))
            }
        }
    }
}

/// Split a JSON pointer into unescaped tokens.
fn tokens(path: &str) -> Result<Vec<String>> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    let Some(rest) = path.strip_prefix('/') else {
        return Err(Error::patch(format!("invalid JSON pointer '{path}'")));
    };
    Ok(rest
        .split('/')
        .map(|t| t.replace("~1", "/").replace("~0", "~"))
        .collect())
}

fn array_index(token: &str, len: usize, path: &str) -> Result<usize> {
    let idx: usize = token
        .parse()
        .map_err(|_| Error::patch(format!("invalid array index '{token}' in {path}")))?;
    if idx >= len {
        return Err(Error::patch(format!("index {idx} out of bounds in {path}")));
    }
    Ok(idx)
}

fn pointer<'a>(doc: &'a Value, path: &str) -> Result<&'a Value> {
    let mut current = doc;
    for token in tokens(path)? {
        current = match current {
            Value::Object(map) => map.get(&token),
            Value::Array(items) => Some(&items[array_index(&token, items.len(), path)?]),
            _ => None,
        }
        .ok_or_else(|| Error::patch(format!("path {path} does not exist")))?;
    }
    Ok(current)
}

fn pointer_mut<'a>(doc: &'a mut Value, path: &str) -> Result<&'a mut Value> {
    let mut current = doc;
    for token in tokens(path)? {
        current = match current {
            Value::Object(map) => map.get_mut(&token),
            Value::Array(items) => {
                let idx = array_index(&token, items.len(), path)?;
                items.get_mut(idx)
            }
            _ => None,
        }
        .ok_or_else(|| Error::patch(format!("path {path} does not exist")))?;
    }
    Ok(current)
}

/// Resolve the container of the last token.
fn parent_mut<'a>(doc: &'a mut Value, path: &str) -> Result<(&'a mut Value, String)> {
    let mut tokens = tokens(path)?;
    let Some(last) = tokens.pop() else {
        return Err(Error::patch("the document root has no parent"));
    };
    let parent_path: String = tokens
        .iter()
        .map(|t| format!("/{}", t.replace('~', "~0").replace('/', "~1")))
        .collect();
    Ok((pointer_mut(doc, &parent_path)?, last))
}

fn add(doc: &mut Value, path: &str, value: Value) -> Result<()> {
    if path.is_empty() {
        *doc = value;
        return Ok(());
    }
    let (parent, last) = parent_mut(doc, path)?;
    match parent {
        Value::Object(map) => {
            map.insert(last, value);
            Ok(())
        }
        Value::Array(items) if last == "-" => {
            items.push(value);
            Ok(())
        }
        Value::Array(items) => {
            let idx: usize = last
                .parse()
                .map_err(|_| Error::patch(format!("invalid array index '{last}' in {path}")))?;
            if idx > items.len() {
                return Err(Error::patch(format!("index {idx} out of bounds in {path}")));
            }
            items.insert(idx, value);
            Ok(())
        }
        _ => Err(Error::patch(format!("cannot add {path}: parent is not a container"))),
    }
}

fn remove(doc: &mut Value, path: &str) -> Result<Value> {
    let (parent, last) = parent_mut(doc, path)?;
    match parent {
        Value::Object(map) => map
            .remove(&last)
            .ok_or_else(|| Error::patch(format!("path {path} does not exist"))),
        Value::Array(items) => {
            let idx = array_index(&last, items.len(), path)?;
            Ok(items.remove(idx))
        }
        _ => Err(Error::patch(format!("path {path} does not exist"))),
    }
}
