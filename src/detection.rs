//! Package-manager detection from lockfiles.
//!
//! Walks up the directory tree from a project path looking for a lockfile, respecting Git
//! repository boundaries and system directory constraints.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// JavaScript package managers recognised by their lockfiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PackageManager {
    #[default]
    Npm,
    Pnpm,
    Yarn,
    Bun,
}

/// Lockfiles in lookup order. The first one present in a directory wins.
const LOCKFILES: &[(&str, PackageManager)] = &[
    ("pnpm-lock.yaml", PackageManager::Pnpm),
    ("yarn.lock", PackageManager::Yarn),
    ("bun.lockb", PackageManager::Bun),
    ("bun.lock", PackageManager::Bun),
    ("package-lock.json", PackageManager::Npm),
];

impl PackageManager {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Pnpm => "pnpm",
            Self::Yarn => "yarn",
            Self::Bun => "bun",
        }
    }

    /// Command that adds `package` to a project.
    pub fn install_command(self, package: &str) -> String {
        match self {
            Self::Npm => format!("npm install {}", package),
            Self::Pnpm => format!("pnpm add {}", package),
            Self::Yarn => format!("yarn add {}", package),
            Self::Bun => format!("bun add {}", package),
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect the package manager for the project at `start`, defaulting to npm.
pub fn detect_package_manager(start: &Path) -> PackageManager {
    find_lockfile_with_constraints(start).map_or_else(
        || {
            debug!("No lockfile found from {}, assuming npm", start.display());
            PackageManager::Npm
        },
        |(manager, _)| manager,
    )
}

/// Find a lockfile walking up from the given path, respecting all constraints.
///
/// Constraints:
/// - Stop at system boundaries (/, /usr, C:\Windows, etc.)
/// - Stop at the Git repository root (don't exit the repo)
/// - If not in a Git repo, only search up to 2 directories
pub fn find_lockfile_with_constraints(start: &Path) -> Option<(PackageManager, PathBuf)> {
    let git_root = find_git_root(start);
    let max_depth = if git_root.is_some() { None } else { Some(2) };

    let mut current = start.to_path_buf();
    let mut depth = 0;

    loop {
        for (name, manager) in LOCKFILES {
            let lockfile = current.join(name);
            if lockfile.is_file() {
                debug!("Found {} at {}", name, current.display());
                return Some((*manager, lockfile));
            }
        }

        if is_boundary_directory(&current) {
            debug!("Hit boundary directory: {}", current.display());
            break;
        }

        if let Some(ref git_root) = git_root
            && current == git_root.as_path()
        {
            break;
        }

        if let Some(max) = max_depth
            && depth >= max
        {
            break;
        }

        match current.parent() {
            Some(parent) => {
                current = parent.to_path_buf();
                depth += 1;
            }
            None => break,
        }
    }

    None
}

/// Find the root of a Git repository by looking for a .git directory or file.
///
/// Stops at the first .git found (handles submodules correctly).
pub fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(".git").exists() {
            return Some(current);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return None,
        }
    }
}

/// Filesystem roots and system directories stop the search.
pub fn is_boundary_directory(path: &Path) -> bool {
    path.parent().is_none() || is_system_directory(path)
}

/// Check if the given path is a protected system directory.
pub fn is_system_directory(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();

    let unix_system_dirs = [
        "/usr", "/etc", "/var", "/opt", "/srv", "/bin", "/sbin", "/lib", "/lib64", "/boot", "/dev",
        "/proc", "/sys", "/run",
    ];

    for sys_dir in &unix_system_dirs {
        if path_str == *sys_dir || path_str.starts_with(&format!("{}/", sys_dir)) {
            return true;
        }
    }

    let windows_system_patterns = [
        ":\\windows",
        ":\\program files",
        ":\\program files (x86)",
        ":\\programdata",
        ":\\$",
    ];

    windows_system_patterns
        .iter()
        .any(|pattern| path_str.contains(pattern))
}
