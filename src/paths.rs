//! Application directory and database file resolution

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Extension of every database file a store creates
pub const DATABASE_EXTENSION: &str = "db";

/// Directory name used for an application under the config directory
///
/// Unix-likes other than macOS get a lowercased name with whitespace runs
/// replaced by `-`; macOS and Windows keep the name as given.
pub fn app_dir_name(app_name: &str) -> String {
    if cfg!(any(target_os = "macos", target_os = "windows")) {
        app_name.to_string()
    } else {
        posixify(app_name)
    }
}

fn posixify(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// The per-user directory for `app_name`, rooted at `base` or at the
/// platform config directory when no base is given. Not created here.
///
/// The directory name must be a single path component, so the result always
/// sits directly under the root.
pub fn app_dir(app_name: &str, base: Option<&Path>) -> Result<PathBuf> {
    let dir_name = app_dir_name(app_name);
    check_component("application", &dir_name)?;
    let root = match base {
        Some(base) => base.to_path_buf(),
        None => dirs::config_dir().ok_or_else(|| Error::NoAppDir(app_name.to_string()))?,
    };
    Ok(root.join(dir_name))
}

/// Create `dir` (and parents) if missing and return its canonical form
pub fn ensure_dir(dir: &Path) -> Result<PathBuf> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(dir.canonicalize()?)
}

/// Path of the database file named `db_name` inside `base`
pub fn database_file(base: &Path, db_name: &str) -> Result<PathBuf> {
    validate_db_name(db_name)?;
    Ok(base.join(format!("{}.{}", db_name, DATABASE_EXTENSION)))
}

pub(crate) fn validate_db_name(db_name: &str) -> Result<()> {
    check_component("database", db_name)
}

/// Reject anything but a single, non-empty path component
fn check_component(kind: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation(format!("{} name must not be empty", kind)));
    }
    let is_path = name.contains(['/', '\\']) || Path::new(name).is_absolute();
    if is_path || name == "." || name == ".." {
        return Err(Error::Validation(format!(
            "{} name `{}` must be a plain file name",
            kind, name
        )));
    }
    Ok(())
}

/// Files SQLite may leave next to a database file
pub fn sidecar_files(db_path: &Path) -> Vec<PathBuf> {
    ["-journal", "-wal", "-shm"]
        .iter()
        .map(|suffix| {
            let mut name = db_path.as_os_str().to_os_string();
            name.push(suffix);
            PathBuf::from(name)
        })
        .collect()
}
