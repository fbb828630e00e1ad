//! Manifest inputs
//!
//! Files are taken as given; directories contribute their `.yaml`, `.yml`
//! and `.json` files in file-name order. `-` stands for standard input.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{CliError, Result};

const MANIFEST_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// One source of manifests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    /// Name used in decode errors
    pub fn name(&self) -> String {
        match self {
            Input::Stdin => "<stdin>".to_string(),
            Input::File(path) => path.display().to_string(),
        }
    }

    pub fn open(&self) -> Result<Box<dyn Read>> {
        match self {
            Input::Stdin => Ok(Box::new(io::stdin().lock())),
            Input::File(path) => {
                let file = File::open(path).map_err(|e| CliError::Io {
                    message: format!("{}: {}", path.display(), e),
                })?;
                Ok(Box::new(BufReader::new(file)))
            }
        }
    }
}

fn is_manifest(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MANIFEST_EXTENSIONS.contains(&ext))
}

/// Resolve the `--file` arguments, reading stdin when there are none
pub fn collect(paths: &[PathBuf], recursive: bool) -> Result<Vec<Input>> {
    if paths.is_empty() {
        return Ok(vec![Input::Stdin]);
    }

    let mut inputs = Vec::new();
    for path in paths {
        if path.as_os_str() == "-" {
            inputs.push(Input::Stdin);
        } else if path.is_dir() {
            let before = inputs.len();
            let depth = if recursive { usize::MAX } else { 1 };
            for entry in WalkDir::new(path)
                .min_depth(1)
                .max_depth(depth)
                .sort_by_file_name()
            {
                let entry = entry.map_err(|e| CliError::Io {
                    message: e.to_string(),
                })?;
                if entry.file_type().is_file() && is_manifest(entry.path()) {
                    inputs.push(Input::File(entry.into_path()));
                }
            }
            if inputs.len() == before {
                tracing::warn!(path = %path.display(), "no manifests found in directory");
            }
        } else if path.is_file() {
            inputs.push(Input::File(path.clone()));
        } else {
            return Err(CliError::Io {
                message: format!("{}: no such file or directory", path.display()),
            });
        }
    }

    Ok(inputs)
}
