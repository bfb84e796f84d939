// src/store/paths.rs

//! Lexical path helpers for the job store.

use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding normal component where there is one.
///
/// The filesystem is never consulted, so symlinks are not followed. Two
/// spellings of the same job directory (`jobs/./a`, `jobs/b/../a`) end up
/// with the same key, which is what the submitter's visited set relies on.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(comp),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Whether `sub` lies strictly inside `dir` (both already normalized).
pub fn is_strict_subdir(sub: &Path, dir: &Path) -> bool {
    sub != dir && sub.starts_with(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_cur_dir_and_folds_parent() {
        assert_eq!(normalize(Path::new("./jobs/./a")), PathBuf::from("jobs/a"));
        assert_eq!(normalize(Path::new("jobs/b/../a")), PathBuf::from("jobs/a"));
        assert_eq!(normalize(Path::new("/root/../x")), PathBuf::from("/x"));
        assert_eq!(normalize(Path::new("/..")), PathBuf::from("/"));
    }

    #[test]
    fn leading_parent_dirs_are_kept() {
        assert_eq!(normalize(Path::new("../x/y")), PathBuf::from("../x/y"));
        assert_eq!(normalize(Path::new("../../x")), PathBuf::from("../../x"));
        assert_eq!(normalize(Path::new(".")), PathBuf::from("."));
    }

    #[test]
    fn strict_subdir() {
        let dir = Path::new("jobs/a");
        assert!(is_strict_subdir(Path::new("jobs/a/labels"), dir));
        assert!(!is_strict_subdir(Path::new("jobs/a"), dir));
        assert!(!is_strict_subdir(Path::new("jobs/ab"), dir));
    }
}
