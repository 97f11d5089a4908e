use crate::kustomization::GeneratorArgs;
use crate::{Error, Result, ResultExt};
use kust_fs::{Loader, NormalizedPath};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static VALID_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-._a-zA-Z0-9]+$").unwrap()
});

/// One value of a generated resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataValue {
    Text(String),
    Binary(Vec<u8>),
}

/// Gather every key/value pair an entry declares, in a stable key order.
///
/// Keys must be valid and unique across all sources of the entry.
pub fn collect_data(loader: &dyn Loader, args: &GeneratorArgs) -> Result<BTreeMap<String, DataValue>> {
    let mut data = BTreeMap::new();
    let mut add = |key: String, value: DataValue| -> Result<()> {
        if !VALID_KEY.is_match(&key) {
            return Err(generator_error(args, format!("invalid key '{key}'")));
        }
        if data.insert(key.clone(), value).is_some() {
            return Err(generator_error(args, format!("duplicate key '{key}'")));
        }
        Ok(())
    };

    for literal in &args.literals {
        let (key, value) = literal
            .split_once('=')
            .ok_or_else(|| generator_error(args, format!("literal '{literal}' is not key=value")))?;
        add(key.to_string(), DataValue::Text(unquote(value).to_string()))?;
    }

    for file in &args.files {
        let (key, path) = match file.split_once('=') {
            Some((key, path)) => (key.to_string(), path),
            None => {
                let key = NormalizedPath::new(file)
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| generator_error(args, format!("file '{file}' has no name")))?;
                (key, file.as_str())
            }
        };
        let bytes = loader.load(path).with_context(|| format!("generator '{}'", args.name))?;
        let value = match String::from_utf8(bytes) {
            Ok(text) => DataValue::Text(text),
            Err(e) => DataValue::Binary(e.into_bytes()),
        };
        add(key, value)?;
    }

    if let Some(env) = &args.env {
        let bytes = loader.load(env).with_context(|| format!("generator '{}'", args.name))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| generator_error(args, format!("env file '{env}' is not UTF-8")))?;
        for (key, value) in parse_env(&text) {
            add(key, DataValue::Text(value))?;
        }
    }

    Ok(data)
}

/// `KEY=value` lines; blank lines and `#` comments are skipped. A bare `KEY`
/// takes its value from the process environment.
fn parse_env(text: &str) -> Vec<(String, String)> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| match line.split_once('=') {
            Some((key, value)) => (key.trim().to_string(), value.to_string()),
            None => (line.to_string(), std::env::var(line).unwrap_or_default()),
        })
        .collect()
}

/// Strip one pair of matching surrounding quotes.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn generator_error(args: &GeneratorArgs, reason: String) -> Error {
    Error::Generator {
        name: args.name.clone(),
        reason,
    }
}
