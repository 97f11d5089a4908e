//! Applying an edit at every location a field spec names

use crate::config::FieldSpec;
use crate::{Error, Result};
use kust_resource::Resource;
use serde_json::{Map, Value};

/// Run `edit` on the value at `path` inside `value`.
///
/// A sequence met before the last segment fans out: the rest of the path is
/// applied to each element. With `create`, missing intermediate keys become
/// mappings and a missing leaf is handed to `edit` as `null`. Without it,
/// missing paths are skipped.
pub fn mutate_field(
    value: &mut Value,
    path: &[&str],
    create: bool,
    edit: &mut dyn FnMut(&mut Value) -> Result<()>,
) -> Result<()> {
    let Some((first, rest)) = path.split_first() else {
        return Ok(());
    };

    let map = match value {
        Value::Object(map) => map,
        Value::Array(items) => {
            for item in items {
                if !item.is_object() {
                    return Err(mutation_error(path, format!("expected a mapping, found {item}")));
                }
                mutate_field(item, path, create, edit)?;
            }
            return Ok(());
        }
        other => {
            return Err(mutation_error(path, format!("expected a mapping, found {other}")));
        }
    };

    if !map.contains_key(*first) {
        if !create {
            return Ok(());
        }
        let placeholder = if rest.is_empty() {
            Value::Null
        } else {
            Value::Object(Map::new())
        };
        map.insert(first.to_string(), placeholder);
    }

    let Some(child) = map.get_mut(*first) else {
        return Ok(());
    };
    if rest.is_empty() {
        return edit(child);
    }

    match child {
        Value::Null if create => {
            *child = Value::Object(Map::new());
            mutate_field(child, rest, create, edit)
        }
        Value::Null => Ok(()),
        Value::Object(_) | Value::Array(_) => mutate_field(child, rest, create, edit),
        other => Err(mutation_error(
            rest,
            format!("'{first}' holds {other}, not a mapping or sequence"),
        )),
    }
}

/// Run `edit` at `spec`'s path when `spec` selects the resource.
///
/// Returns whether the spec applied. Errors name the resource and path.
pub fn mutate_resource(
    resource: &mut Resource,
    spec: &FieldSpec,
    edit: &mut dyn FnMut(&mut Value) -> Result<()>,
) -> Result<bool> {
    if !spec.applies_to(&resource.gvk()) {
        return Ok(false);
    }
    let id = resource.id();
    mutate_field(
        resource.object_mut(),
        &spec.segments(),
        spec.create_if_not_present,
        edit,
    )
    .map_err(|e| match e {
        Error::FieldMutation { reason, .. } => Error::FieldMutation {
            id: id.to_string(),
            path: spec.path.clone(),
            reason,
        },
        other => other,
    })?;
    Ok(true)
}

/// Error for an edit that found a value of the wrong shape.
///
/// [`mutate_resource`] fills in the resource and path.
pub fn invalid_value(reason: impl Into<String>) -> Error {
    Error::FieldMutation {
        id: String::new(),
        path: String::new(),
        reason: reason.into(),
    }
}

fn mutation_error(path: &[&str], reason: String) -> Error {
    Error::FieldMutation {
        id: String::new(),
        path: path.join("/"),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn set_to(new: Value) -> impl FnMut(&mut Value) -> Result<()> {
        move |v: &mut Value| {
            *v = new.clone();
            Ok(())
        }
    }

    #[test]
    fn edits_existing_leaf() {
        let mut doc = json!({"metadata": {"name": "web"}});
        mutate_field(&mut doc, &["metadata", "name"], false, &mut set_to(json!("x-web"))).unwrap();
        assert_eq!(doc, json!({"metadata": {"name": "x-web"}}));
    }

    #[test]
    fn missing_path_is_skipped_without_create() {
        let mut doc = json!({"metadata": {}});
        mutate_field(&mut doc, &["spec", "selector"], false, &mut set_to(json!(1))).unwrap();
        assert_eq!(doc, json!({"metadata": {}}));
    }

    #[test]
    fn create_builds_intermediate_maps_and_offers_null_leaf() {
        let mut doc = json!({});
        let mut seen = Vec::new();
        mutate_field(&mut doc, &["spec", "template", "labels"], true, &mut |v: &mut Value| {
            seen.push(v.clone());
            *v = json!({"app": "web"});
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![Value::Null]);
        assert_eq!(doc, json!({"spec": {"template": {"labels": {"app": "web"}}}}));
    }

    #[test]
    fn sequences_fan_out() {
        let mut doc = json!({"spec": {"containers": [{"name": "a"}, {"name": "b"}, {}]}});
        let mut count = 0;
        mutate_field(&mut doc, &["spec", "containers", "name"], false, &mut |v: &mut Value| {
            count += 1;
            *v = json!(format!("{}-x", v.as_str().unwrap_or_default()));
            Ok(())
        })
        .unwrap();
        assert_eq!(count, 2);
        assert_eq!(doc["spec"]["containers"][1]["name"], json!("b-x"));
    }

    #[test]
    fn scalar_mid_path_is_an_error() {
        let mut doc = json!({"spec": "oops"});
        let err = mutate_field(&mut doc, &["spec", "selector"], true, &mut set_to(json!(1)))
            .unwrap_err();
        assert!(matches!(err, Error::FieldMutation { .. }));
    }
}
