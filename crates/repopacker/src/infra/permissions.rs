//! Execute permission checks for the resolved tool.

use std::path::Path;

use crate::domain::errors::PackError;

#[cfg(unix)]
const REPAIRED_MODE: u32 = 0o755;

/// Make sure `path` can be executed, granting `0755` once if it cannot.
#[cfg(unix)]
pub fn ensure_executable(path: &Path) -> Result<(), PackError> {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    if is_executable(path) {
        return Ok(());
    }

    tracing::warn!(path = %path.display(), "repomix is not executable, granting 0755");
    fs::set_permissions(path, fs::Permissions::from_mode(REPAIRED_MODE)).map_err(|source| {
        PackError::PermissionRepairFailed {
            path: path.to_path_buf(),
            source: Some(source),
        }
    })?;

    if is_executable(path) {
        Ok(())
    } else {
        Err(PackError::PermissionRepairFailed {
            path: path.to_path_buf(),
            source: None,
        })
    }
}

/// Windows has no execute bit; launch errors surface at spawn time instead.
#[cfg(not(unix))]
pub fn ensure_executable(_path: &Path) -> Result<(), PackError> {
    Ok(())
}

#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    use super::*;
    use crate::domain::model::FailureKind;

    #[test]
    fn leaves_executable_files_alone() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("tool");
        fs::write(&path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o700)).unwrap();

        ensure_executable(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o700);
    }

    #[test]
    fn grants_execute_permission() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("tool");
        fs::write(&path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        assert!(!is_executable(&path));

        ensure_executable(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o755);
    }

    #[test]
    fn missing_file_cannot_be_repaired() {
        let temp = tempfile::tempdir().unwrap();
        let err = ensure_executable(&temp.path().join("vanished")).unwrap_err();
        assert_eq!(err.kind(), FailureKind::PermissionRepairFailed);
    }
}
