//! Removal of native build artifacts left behind by the server build

use anyhow::{Context, Result};
use glob::Pattern;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_EXTENSIONS: [&str; 4] = [".so", ".o", ".dylib", ".h"];

/// Accept `so` as well as `.so`.
pub fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|ext| {
            if ext.starts_with('.') {
                ext.clone()
            } else {
                format!(".{}", ext)
            }
        })
        .collect()
}

/// Files directly in `dir` (or anywhere below it when `recursive`) whose
/// name ends with one of `extensions`, sorted.
pub fn find_artifacts(dir: &Path, extensions: &[String], recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("'{}' is not a valid directory", dir.display());
    }

    let root = Pattern::escape(&dir.to_string_lossy());
    let pattern = if recursive {
        format!("{}/**/*", root)
    } else {
        format!("{}/*", root)
    };

    let mut found = Vec::new();
    for entry in glob::glob(&pattern).context("Invalid directory pattern")? {
        let path = entry?;
        let matches = path
            .file_name()
            .map(|name| {
                let name = name.to_string_lossy();
                extensions.iter().any(|ext| name.ends_with(ext.as_str()))
            })
            .unwrap_or(false);
        if matches && path.is_file() {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

pub fn run_clean(
    dir: &Path,
    extensions: &[String],
    dry_run: bool,
    recursive: bool,
    yes: bool,
) -> Result<()> {
    let extensions = normalize_extensions(extensions);
    let absolute = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());

    println!(
        "{}Deleting files with extensions {} from '{}'{}",
        if dry_run { "Dry run: " } else { "" },
        extensions.join(", "),
        absolute.display(),
        if recursive { " (including subdirectories)" } else { "" }
    );

    if !dry_run && !yes {
        print!("Are you sure you want to proceed? (y/N): ");
        io::stdout().flush()?;
        let mut response = String::new();
        io::stdin().read_line(&mut response)?;

        if !response.trim().eq_ignore_ascii_case("y") {
            println!("Operation cancelled.");
            return Ok(());
        }
    }

    let artifacts = find_artifacts(dir, &extensions, recursive)?;
    for path in &artifacts {
        if dry_run {
            println!("Would delete: {}", path.display());
        } else {
            std::fs::remove_file(path)
                .with_context(|| format!("Failed to delete {}", path.display()))?;
            println!("Deleted: {}", path.display());
        }
    }

    println!();
    println!(
        "{} {} file(s)",
        if dry_run { "Would delete" } else { "Deleted" },
        artifacts.len()
    );
    Ok(())
}
