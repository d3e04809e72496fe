use std::path::PathBuf;

/// Locate an executable on `PATH`.
pub fn find_binary(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Names from `dependencies` that cannot be found on `PATH`.
pub fn missing_binaries(dependencies: &[String]) -> Vec<&str> {
    dependencies
        .iter()
        .map(String::as_str)
        .filter(|dep| find_binary(dep).is_none())
        .collect()
}
