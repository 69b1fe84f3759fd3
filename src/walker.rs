/*!
 * Directory traversal producing one visit per directory that holds files
 */

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use glob_match::glob_match;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, WixGenError};
use crate::path::NormalizedPath;
use crate::types::DirectoryVisit;
use crate::utils::DEFAULT_IGNORE;

/// Order in which siblings are visited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum WalkOrder {
    /// Siblings sorted by file name, reproducible across filesystems
    #[default]
    Sorted,
    /// Whatever order the filesystem enumerates entries in
    Native,
}

/// Rules deciding which entries the walker reports
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Sibling ordering
    pub order: WalkOrder,
    /// Descend into symlinked directories
    pub follow_links: bool,
    /// Glob patterns matched against entry names
    pub ignore_patterns: Vec<String>,
    /// Also apply the built-in ignore list
    pub default_ignore: bool,
    /// File names in the root directory that are already handled elsewhere
    pub root_exclusions: Vec<String>,
    /// Files that must never be reported, e.g. the document being written
    pub skip_files: Vec<PathBuf>,
}

impl WalkOptions {
    /// Build walk options from the application configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            order: config.order,
            follow_links: config.follow_links,
            ignore_patterns: config.ignore_patterns.clone(),
            default_ignore: config.default_ignore,
            root_exclusions: vec![config.product.main_executable.clone()],
            skip_files: Vec::new(),
        }
    }
}

/// Lazy pre-order walk over a build directory
///
/// The root is always reported first, even without files, so the caller can
/// emit the root's own files before anything nested. Every other directory is
/// reported only if it directly contains at least one file. A directory is
/// fully reported before any of its subdirectories.
pub struct TreeWalker {
    options: WalkOptions,
    root: Option<PathBuf>,
    pending: Vec<(PathBuf, NormalizedPath)>,
    failed: bool,
}

impl TreeWalker {
    /// Create a walker rooted at `root`
    ///
    /// Nothing is read until the first call to `next`.
    pub fn new(root: impl AsRef<Path>, options: WalkOptions) -> Self {
        Self {
            options,
            root: Some(root.as_ref().to_path_buf()),
            pending: Vec::new(),
            failed: false,
        }
    }

    /// Check if an entry should be ignored based on patterns and defaults
    pub fn should_ignore(&self, name: &str) -> bool {
        if self
            .options
            .ignore_patterns
            .iter()
            .any(|pattern| glob_match(pattern, name))
        {
            return true;
        }

        self.options.default_ignore && DEFAULT_IGNORE.iter().any(|&p| glob_match(p, name))
    }

    /// Names of skip files that live directly inside `dir`
    ///
    /// Skip files are canonical paths, so `dir` is canonicalized once and the
    /// entries of the directory are then compared by name only.
    fn skipped_names(&self, dir: &Path) -> Vec<String> {
        if self.options.skip_files.is_empty() {
            return Vec::new();
        }
        let Ok(canonical) = fs::canonicalize(dir) else {
            return Vec::new();
        };
        self.options
            .skip_files
            .iter()
            .filter(|skip| skip.parent() == Some(canonical.as_path()))
            .filter_map(|skip| skip.file_name()?.to_str().map(str::to_string))
            .collect()
    }

    /// List one directory, returning its subdirectories and its file names
    fn read_directory(
        &self,
        dir: &Path,
        path: &NormalizedPath,
        is_root: bool,
    ) -> Result<(Vec<(PathBuf, NormalizedPath)>, Vec<String>)> {
        if is_root {
            // surfaces a missing root as the plain io error
            fs::read_dir(dir)?;
        }

        let mut walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.options.follow_links);
        if self.options.order == WalkOrder::Sorted {
            walker = walker.sort_by_file_name();
        }

        let skipped = self.skipped_names(dir);
        let mut subdirs = Vec::new();
        let mut files = Vec::new();

        for entry in walker {
            let entry = entry?;
            let name = entry
                .file_name()
                .to_str()
                .ok_or_else(|| WixGenError::NonUtf8Path(entry.path().to_path_buf()))?
                .to_string();

            if self.should_ignore(&name) {
                debug!(path = %entry.path().display(), "ignored");
                continue;
            }

            if entry.file_type().is_dir() {
                subdirs.push((entry.path().to_path_buf(), path.join(&name)));
            } else if entry.path_is_symlink() && entry.path().is_dir() {
                debug!(path = %entry.path().display(), "skipping directory symlink");
            } else if entry.file_type().is_file() || entry.path_is_symlink() {
                if is_root && self.options.root_exclusions.contains(&name) {
                    continue;
                }
                if skipped.contains(&name) {
                    debug!(path = %entry.path().display(), "skipping output file");
                    continue;
                }
                files.push(name);
            }
        }

        Ok((subdirs, files))
    }

    /// Advance to the next directory worth reporting
    fn step(&mut self) -> Result<Option<DirectoryVisit>> {
        let mut is_root = false;
        if let Some(root) = self.root.take() {
            let path = NormalizedPath::try_from(root.as_path())?;
            self.pending.push((root, path));
            is_root = true;
        }

        while let Some((dir, path)) = self.pending.pop() {
            let (subdirs, files) = self.read_directory(&dir, &path, is_root)?;

            debug!(
                dir = %path,
                files = files.len(),
                subdirs = subdirs.len(),
                "visited directory"
            );

            // first subdirectory ends up on top of the stack
            self.pending.extend(subdirs.into_iter().rev());

            if is_root || !files.is_empty() {
                return Ok(Some(DirectoryVisit { path, files }));
            }
            is_root = false;
        }

        Ok(None)
    }
}

impl Iterator for TreeWalker {
    type Item = Result<DirectoryVisit>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.step() {
            Ok(visit) => visit.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        File::create(path).unwrap();
    }

    fn sorted_options() -> WalkOptions {
        WalkOptions {
            root_exclusions: vec!["app.exe".to_string()],
            ..WalkOptions::default()
        }
    }

    fn relative_visits(root: &Path, options: WalkOptions) -> Vec<(String, Vec<String>)> {
        let root_len = NormalizedPath::try_from(root).unwrap().len();
        TreeWalker::new(root, options)
            .map(|visit| {
                let visit = visit.unwrap();
                (visit.path.segments()[root_len..].join("/"), visit.files)
            })
            .collect()
    }

    #[test]
    fn test_root_visit_comes_first_without_main_executable() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "app.exe");
        touch(temp.path(), "lib/core.dll");

        let visits = relative_visits(temp.path(), sorted_options());
        assert_eq!(
            visits,
            vec![
                (String::new(), vec![]),
                ("lib".to_string(), vec!["core.dll".to_string()]),
            ]
        );
    }

    #[test]
    fn test_preorder_skips_directories_without_files() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "b/y.dll");
        touch(temp.path(), "a/x.dll");
        touch(temp.path(), "a/deep/er/z.dll");
        fs::create_dir_all(temp.path().join("a/empty")).unwrap();
        touch(temp.path(), "readme.txt");

        let visits = relative_visits(temp.path(), sorted_options());
        let dirs: Vec<_> = visits.iter().map(|(d, _)| d.as_str()).collect();
        assert_eq!(dirs, ["", "a", "a/deep/er", "b"]);
        assert_eq!(visits[0].1, ["readme.txt"]);
    }

    #[test]
    fn test_directory_files_are_grouped_before_subdirectories() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "lib/a.dll");
        touch(temp.path(), "lib/m/inner.dll");
        touch(temp.path(), "lib/z.dll");

        let visits = relative_visits(temp.path(), sorted_options());
        assert_eq!(visits[1], ("lib".to_string(), vec!["a.dll".into(), "z.dll".into()]));
        assert_eq!(visits[2].0, "lib/m");
    }

    #[test]
    fn test_native_order_covers_same_files() {
        let temp = tempdir().unwrap();
        for name in ["q/1", "p/2", "p/r/3", "s/4"] {
            touch(temp.path(), name);
        }
        let native = WalkOptions {
            order: WalkOrder::Native,
            ..sorted_options()
        };

        let mut sorted = relative_visits(temp.path(), sorted_options());
        let mut unsorted = relative_visits(temp.path(), native);
        sorted.sort();
        unsorted.sort();
        assert_eq!(sorted, unsorted);
    }

    #[test]
    fn test_ignore_patterns_and_defaults() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "keep.dll");
        touch(temp.path(), "debug.pdb");
        touch(temp.path(), "Thumbs.db");
        touch(temp.path(), "cache/blob.bin");

        let options = WalkOptions {
            ignore_patterns: vec!["*.pdb".to_string(), "cache".to_string()],
            default_ignore: true,
            ..sorted_options()
        };
        let visits = relative_visits(temp.path(), options);
        assert_eq!(visits, vec![(String::new(), vec!["keep.dll".to_string()])]);
    }

    #[test]
    fn test_skip_files_by_canonical_path() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "out.wxs");
        touch(temp.path(), "keep.dll");

        let options = WalkOptions {
            skip_files: vec![fs::canonicalize(temp.path().join("out.wxs")).unwrap()],
            ..sorted_options()
        };
        let visits = relative_visits(temp.path(), options);
        assert_eq!(visits[0].1, ["keep.dll"]);
    }

    #[test]
    fn test_skip_files_only_match_their_own_directory() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "out.wxs");
        touch(temp.path(), "sub/out.wxs");

        let options = WalkOptions {
            skip_files: vec![fs::canonicalize(temp.path().join("out.wxs")).unwrap()],
            ..sorted_options()
        };
        let visits = relative_visits(temp.path(), options);
        assert_eq!(
            visits,
            vec![
                (String::new(), vec![]),
                ("sub".to_string(), vec!["out.wxs".to_string()]),
            ]
        );
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let temp = tempdir().unwrap();
        let mut walker = TreeWalker::new(temp.path().join("missing"), sorted_options());

        match walker.next() {
            Some(Err(WixGenError::Io(e))) => {
                assert_eq!(e.kind(), std::io::ErrorKind::NotFound)
            }
            other => panic!("expected io error, got {:?}", other),
        }
        assert!(walker.next().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_name_is_an_error() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = tempdir().unwrap();
        touch(temp.path(), "lib/good.dll");
        let bad = temp.path().join("lib").join(OsStr::from_bytes(b"bad\xff.dll"));
        if File::create(&bad).is_err() {
            // filesystem refuses non UTF-8 names
            return;
        }

        let mut walker = TreeWalker::new(temp.path(), sorted_options());
        assert!(walker.next().unwrap().is_ok());
        match walker.next() {
            Some(Err(WixGenError::NonUtf8Path(path))) => assert_eq!(path, bad),
            other => panic!("expected a non UTF-8 error, got {:?}", other),
        }
        assert!(walker.next().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_ends_the_walk() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        touch(temp.path(), "a.dll");
        touch(temp.path(), "locked/b.dll");
        touch(temp.path(), "z/c.dll");
        let locked = temp.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // privileged users read through the mode bits
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let mut walker = TreeWalker::new(temp.path(), sorted_options());
        let root = walker.next().unwrap().unwrap();
        assert_eq!(root.files, ["a.dll"]);
        assert!(matches!(walker.next(), Some(Err(WixGenError::Walk(_)))));
        assert!(walker.next().is_none());

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_symlinks_are_not_followed_by_default() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "real/a.dll");
        std::os::unix::fs::symlink(temp.path().join("real"), temp.path().join("alias")).unwrap();
        std::os::unix::fs::symlink(
            temp.path().join("real/a.dll"),
            temp.path().join("link.dll"),
        )
        .unwrap();

        let visits = relative_visits(temp.path(), sorted_options());
        let dirs: Vec<_> = visits.iter().map(|(d, _)| d.as_str()).collect();
        assert_eq!(dirs, ["", "real"]);
        assert_eq!(visits[0].1, ["link.dll"]);

        let following = WalkOptions {
            follow_links: true,
            ..sorted_options()
        };
        let visits = relative_visits(temp.path(), following);
        let dirs: Vec<_> = visits.iter().map(|(d, _)| d.as_str()).collect();
        assert_eq!(dirs, ["", "alias", "real"]);
    }
}
