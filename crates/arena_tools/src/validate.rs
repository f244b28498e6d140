//! Tables validation.

use std::path::{Path, PathBuf};

use arena_core::data::ArenaTables;
use tracing::{debug, info};

use crate::ToolError;

/// Parse and validate one tables file.
///
/// # Errors
///
/// Returns [`ToolError::Io`] if unreadable, or [`ToolError::Arena`] with the
/// parse error or every validation problem.
pub fn validate_file(path: &Path) -> Result<ArenaTables, ToolError> {
    let text = std::fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tables = ArenaTables::from_ron_str(&text, &path.display().to_string())?;
    debug!(path = %path.display(), "Tables valid");
    Ok(tables)
}

/// Validate a tables file, or every `.ron` file in a directory.
///
/// Returns the files checked, sorted. Stops at the first invalid file.
///
/// # Errors
///
/// Returns [`ToolError::NoDataFiles`] for a directory without `.ron` files,
/// otherwise the first error from [`validate_file`].
pub fn validate_path(path: &Path) -> Result<Vec<PathBuf>, ToolError> {
    if path.is_file() {
        validate_file(path)?;
        return Ok(vec![path.to_path_buf()]);
    }

    let entries = std::fs::read_dir(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ToolError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file = entry.path();
        if file.extension().is_some_and(|ext| ext == "ron") {
            files.push(file);
        }
    }
    if files.is_empty() {
        return Err(ToolError::NoDataFiles(path.to_path_buf()));
    }
    files.sort();

    for file in &files {
        validate_file(file)?;
    }
    info!(count = files.len(), path = %path.display(), "All tables files valid");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("arena_tools_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_empty_directory_is_error() {
        let dir = scratch_dir("empty");
        assert!(matches!(
            validate_path(&dir),
            Err(ToolError::NoDataFiles(_))
        ));
    }

    #[test]
    fn test_directory_with_valid_and_invalid_files() {
        let dir = scratch_dir("mixed");
        std::fs::write(dir.join("a.ron"), "(session: (min_participants: 3))").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();
        assert_eq!(validate_path(&dir).unwrap(), vec![dir.join("a.ron")]);

        std::fs::write(dir.join("b.ron"), "(session: (min_participants: 1))").unwrap();
        assert!(matches!(
            validate_path(&dir),
            Err(ToolError::Arena(arena_core::error::ArenaError::ValidationError(_)))
        ));
    }

    #[test]
    fn test_missing_path_is_io_error() {
        assert!(matches!(
            validate_path(Path::new("/no/such/tables/dir")),
            Err(ToolError::Io { .. })
        ));
    }
}
