//! Program image loading from disk.

use std::path::{Path, PathBuf};

use vman_bytecode::{ImageError, Program};

#[derive(Debug, thiserror::Error)]
#[error("failed to load '{}': {source}", path.display())]
pub struct LoadError {
    pub path: PathBuf,
    #[source]
    pub source: ImageError,
}

/// Read and validate an image. Nothing executes before the header checks out.
pub fn load(path: &Path) -> Result<Program, LoadError> {
    let program = Program::from_path(path).map_err(|source| LoadError {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        path = %path.display(),
        size = program.len(),
        entry = program.entry_point(),
        "image loaded"
    );
    Ok(program)
}

/// Like [`load`], but reports the error and exits with status 1.
pub fn load_or_exit(path: &Path) -> Program {
    match load(path) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
