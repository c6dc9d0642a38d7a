//! Directory boundary and path canonicalization
//!
//! Every filesystem or shell effect is checked against the boundary triple
//! (working directory, optional project directory, user home). Paths are
//! canonicalized — made absolute, lexically normalized, and symlink-resolved
//! through the nearest existing ancestor — before any comparison, so crafted
//! input like `subdir/../../../etc/passwd` or a symlink pointing outside the
//! tree is caught.

use std::io;
use std::path::{Component, Path, PathBuf};

/// The directory triple every path check is made against.
///
/// `canonicalize` never fails: input that resolves outside the boundary is
/// rebased to the working directory under the requested file's name. That
/// silent redirect is a deliberate containment choice — callers always get
/// a path that is inside the boundary or degraded into it, never an escape.
#[derive(Debug, Clone)]
pub struct Boundary {
    working_dir: PathBuf,
    project_dir: Option<PathBuf>,
    home_dir: PathBuf,
}

impl Boundary {
    /// Create a boundary rooted at `working_dir`.
    ///
    /// The working directory must exist; the user home is discovered from
    /// the environment.
    pub fn new(working_dir: impl AsRef<Path>) -> io::Result<Self> {
        let working_dir = working_dir.as_ref().canonicalize()?;
        let home_dir = dirs::home_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "could not determine home directory")
        })?;
        Ok(Self {
            working_dir,
            project_dir: None,
            home_dir,
        })
    }

    /// Create a boundary with every directory given explicitly (tests, embedding)
    pub fn with_dirs(
        working_dir: impl Into<PathBuf>,
        project_dir: Option<PathBuf>,
        home_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            working_dir: working_dir.into(),
            project_dir,
            home_dir: home_dir.into(),
        }
    }

    /// Set the project directory
    pub fn with_project_dir(mut self, project_dir: impl AsRef<Path>) -> io::Result<Self> {
        self.project_dir = Some(project_dir.as_ref().canonicalize()?);
        Ok(self)
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn project_dir(&self) -> Option<&Path> {
        self.project_dir.as_deref()
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    /// Change the working directory (e.g. after a directory switch).
    ///
    /// Checks are never cached, so subsequent requests resolve against the
    /// new directory immediately.
    pub fn set_working_dir(&mut self, working_dir: impl AsRef<Path>) -> io::Result<()> {
        self.working_dir = working_dir.as_ref().canonicalize()?;
        Ok(())
    }

    /// Canonicalize a requested path into the boundary. Never fails.
    ///
    /// Relative input resolves against the working directory. Input that
    /// resolves outside the working/project trees is rebased to the working
    /// directory combined with just the requested file's name.
    pub fn canonicalize(&self, requested: &Path) -> PathBuf {
        match self.canonicalize_strict(requested) {
            Ok(path) => path,
            Err(resolved) => match resolved.file_name() {
                Some(name) => self.working_dir.join(name),
                None => self.working_dir.clone(),
            },
        }
    }

    /// Canonicalize without the rebase: `Err` carries where the path
    /// actually resolved when that is outside the boundary.
    pub fn canonicalize_strict(&self, requested: &Path) -> Result<PathBuf, PathBuf> {
        if requested.as_os_str().is_empty() {
            return Ok(self.working_dir.clone());
        }

        let joined = if requested.is_absolute() {
            requested.to_path_buf()
        } else {
            self.working_dir.join(requested)
        };

        let resolved = resolve_symlinks(&normalize(&joined));

        if self.contains(&resolved) {
            Ok(resolved)
        } else {
            Err(resolved)
        }
    }

    /// Whether a canonical path lies inside the working or project tree
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.working_dir)
            || self
                .project_dir
                .as_deref()
                .is_some_and(|dir| path.starts_with(dir))
    }

    /// Whether a canonical path lies inside the user's home tree
    pub fn within_home(&self, path: &Path) -> bool {
        path.starts_with(&self.home_dir)
    }

    /// Whether a canonical path lies inside the project tree
    pub fn within_project(&self, path: &Path) -> bool {
        self.project_dir
            .as_deref()
            .is_some_and(|dir| path.starts_with(dir))
    }

    /// The directory session grants are scoped to (project if set, else working)
    pub fn grant_dir(&self) -> &Path {
        self.project_dir.as_deref().unwrap_or(&self.working_dir)
    }
}

/// Lexically normalize a path: resolve `.` and `..` without touching the
/// filesystem. `..` at the root stays at the root.
fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(p) => result.push(p.as_os_str()),
            Component::RootDir => result.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            Component::Normal(name) => result.push(name),
        }
    }
    result
}

/// Resolve symlinks through the nearest existing ancestor.
///
/// The path itself may not exist yet (writes create it); canonicalizing the
/// first ancestor that does exist catches symlinks that would carry the
/// final path outside the boundary.
fn resolve_symlinks(path: &Path) -> PathBuf {
    let mut existing = path.to_path_buf();
    let mut tail: Vec<std::ffi::OsString> = Vec::new();

    while !existing.exists() {
        match (existing.file_name(), existing.parent()) {
            (Some(name), Some(parent)) => {
                tail.push(name.to_os_string());
                existing = parent.to_path_buf();
            }
            _ => return path.to_path_buf(),
        }
    }

    let Ok(mut canonical) = existing.canonicalize() else {
        return path.to_path_buf();
    };
    for name in tail.into_iter().rev() {
        canonical.push(name);
    }
    canonical
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn boundary(work: &TempDir, home: &TempDir) -> Boundary {
        Boundary::with_dirs(
            work.path().canonicalize().unwrap(),
            None,
            home.path().canonicalize().unwrap(),
        )
    }

    #[test]
    fn test_relative_path_resolves_against_working_dir() {
        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let b = boundary(&work, &home);

        let path = b.canonicalize(Path::new("notes.txt"));
        assert_eq!(path, b.working_dir().join("notes.txt"));
    }

    #[test]
    fn test_traversal_is_rebased_to_working_dir() {
        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let b = boundary(&work, &home);

        let path = b.canonicalize(Path::new("../../etc/passwd"));
        assert_eq!(path, b.working_dir().join("passwd"));
    }

    #[test]
    fn test_absolute_path_outside_is_rebased() {
        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let b = boundary(&work, &home);

        let path = b.canonicalize(Path::new("/etc/shadow"));
        assert_eq!(path, b.working_dir().join("shadow"));
    }

    #[test]
    fn test_empty_path_returns_working_dir() {
        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let b = boundary(&work, &home);

        assert_eq!(b.canonicalize(Path::new("")), b.working_dir());
    }

    #[test]
    fn test_containment_holds_for_arbitrary_input() {
        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let b = boundary(&work, &home);

        for input in [
            "../../etc/passwd",
            "/etc/passwd",
            "",
            "a/b/../../../../root/.ssh/id_rsa",
            "./../sibling/file.txt",
            "normal.txt",
            "sub/dir/deep.rs",
        ] {
            let path = b.canonicalize(Path::new(input));
            assert!(
                path.starts_with(b.working_dir()),
                "input {:?} escaped to {:?}",
                input,
                path
            );
        }
    }

    #[test]
    fn test_absolute_path_inside_working_dir_kept() {
        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let b = boundary(&work, &home);

        let inside = b.working_dir().join("kept.txt");
        assert_eq!(b.canonicalize(&inside), inside);
    }

    #[test]
    fn test_project_dir_paths_are_not_rebased() {
        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        let b = Boundary::with_dirs(
            work.path().canonicalize().unwrap(),
            Some(project.path().canonicalize().unwrap()),
            home.path().canonicalize().unwrap(),
        );

        let inside_project = b.project_dir().unwrap().join("src/main.rs");
        assert_eq!(b.canonicalize(&inside_project), inside_project);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escaping_is_rebased() {
        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.txt"), "secret").unwrap();

        let link = work.path().join("link");
        std::os::unix::fs::symlink(outside.path(), &link).unwrap();

        let b = boundary(&work, &home);
        let path = b.canonicalize(Path::new("link/secret.txt"));
        // The link resolves outside the tree, so the request degrades into
        // the working directory instead of following it out.
        assert!(path.starts_with(b.working_dir()));
        assert!(path.ends_with("secret.txt"));
    }

    #[test]
    fn test_nonexistent_nested_path_stays_inside() {
        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let b = boundary(&work, &home);

        let path = b.canonicalize(Path::new("a/b/c/new_file.txt"));
        assert!(path.starts_with(b.working_dir()));
        assert!(path.ends_with("a/b/c/new_file.txt"));
    }

    #[test]
    fn test_set_working_dir_rebinds_resolution() {
        let work = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let mut b = boundary(&work, &home);

        b.set_working_dir(other.path()).unwrap();
        let path = b.canonicalize(Path::new("file.txt"));
        assert!(path.starts_with(other.path().canonicalize().unwrap()));
    }

    #[test]
    fn test_canonicalize_strict_refuses_instead_of_rebasing() {
        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let b = boundary(&work, &home);

        let err = b.canonicalize_strict(Path::new("/etc")).unwrap_err();
        assert_eq!(err, PathBuf::from("/etc"));

        let ok = b.canonicalize_strict(Path::new("sub/file.txt")).unwrap();
        assert!(ok.starts_with(b.working_dir()));
    }

    #[test]
    fn test_normalize_lexical() {
        assert_eq!(normalize(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(normalize(Path::new("/../../x")), PathBuf::from("/x"));
    }
}
