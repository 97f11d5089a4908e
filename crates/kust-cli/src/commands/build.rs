//! The `build` command

use crate::error::{CliError, Result};
use colored::Colorize;
use kust_core::{Build, TransformerConfig};
use kust_fs::{FileLoader, FileSystem, NormalizedPath, RealFileSystem, io};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_PATH: &str = "./";

/// Inputs of one `kust build` invocation.
#[derive(Debug, Clone, Default)]
pub struct BuildArgs {
    pub paths: Vec<String>,
    pub output: Option<PathBuf>,
    pub transformer_config: Option<String>,
}

/// Build the kustomization and emit the result.
///
/// The whole document stream is rendered before anything is written, so a
/// failed build leaves no partial output.
pub fn run_build(cwd: &Path, args: &BuildArgs) -> Result<()> {
    let location = match args.paths.as_slice() {
        [] => DEFAULT_PATH,
        [one] => one.as_str(),
        _ => return Err(CliError::user("specify one path to kustomization.yaml")),
    };

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new());
    let config = transformer_config(cwd, args.transformer_config.as_deref(), &fs)?;

    let location = resolve_location(cwd, location);
    let loader = FileLoader::new(&location, Arc::clone(&fs))?;
    let Build {
        resources,
        diagnostics,
    } = kust_core::build(Box::new(loader), config)?;

    for diagnostic in diagnostics.iter() {
        eprintln!("{}: {}", "warning".yellow().bold(), diagnostic);
    }

    let rendered = resources.encode_as_yaml()?;
    match &args.output {
        Some(output) => {
            let target = NormalizedPath::new(cwd.join(output));
            io::write_atomic(&target, &rendered)?;
            tracing::info!(path = %target, resources = resources.len(), "Wrote build output");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&rendered)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Local paths are taken relative to `cwd`; remote locations pass through.
fn resolve_location(cwd: &Path, location: &str) -> String {
    if kust_fs::is_remote(location) {
        return location.to_string();
    }
    NormalizedPath::new(cwd).join(location).to_string()
}

/// The built-in rules, or the union of the files named by `-t`.
///
/// A directory contributes every file directly inside it, in name order.
fn transformer_config(
    cwd: &Path,
    spec: Option<&str>,
    fs: &Arc<dyn FileSystem>,
) -> Result<TransformerConfig> {
    let Some(spec) = spec else {
        return Ok(TransformerConfig::builtin()?);
    };

    let base = NormalizedPath::new(cwd);
    let as_dir = base.join(spec);
    let paths: Vec<String> = if fs.is_dir(&as_dir) {
        fs.read_dir(&as_dir)?
            .into_iter()
            .filter(|entry| !fs.is_dir(entry))
            .map(|entry| entry.to_string())
            .collect()
    } else {
        spec.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    };
    if paths.is_empty() {
        return Err(CliError::user(format!(
            "no transformer config files found in '{spec}'"
        )));
    }

    tracing::debug!(?paths, "Loading transformer configs");
    let loader = FileLoader::new(base.as_str(), Arc::clone(fs))?;
    Ok(TransformerConfig::from_files(&loader, &paths)?)
}
