//! Lexical path normalization shared by local and remote sources.

use std::path::{Component, Path, PathBuf};

/// True when `p` names an absolute location (`/x`, `C:\x`, `\x`).
pub fn is_rooted(p: &str) -> bool {
    let path = Path::new(p);
    path.is_absolute() || path.has_root() || p.starts_with('/')
}

/// Resolve `.` and `..` without touching the filesystem. `..` at the root stays at the root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::Prefix(p) => out.push(p.as_os_str()),
            Component::RootDir => out.push(comp.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::ParentDir)) {
                    out.push("..");
                } else if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            Component::Normal(seg) => out.push(seg),
        }
    }
    out
}

/// Same as [`normalize`] for `/`-separated URL paths, independent of the host OS.
/// Input must start with `/`; the result does too.
pub fn normalize_slash(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Parent of a `/`-separated path (`/a/b/c` → `/a/b`, `/a` → `/`).
pub fn parent_slash(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(i) => &path[..i],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rooted_inputs() {
        assert!(is_rooted("/etc/passwd"));
        assert!(!is_rooted("README.md"));
        assert!(!is_rooted("../shared/a.txt"));
        assert!(!is_rooted("./a"));
    }

    #[test]
    fn normalize_local() {
        assert_eq!(
            normalize(Path::new("/tpl/scripts/../files/./a.txt")),
            PathBuf::from("/tpl/files/a.txt")
        );
        assert_eq!(normalize(Path::new("/../../x")), PathBuf::from("/x"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn normalize_url_path() {
        assert_eq!(normalize_slash("/host/a/b/../../c.txt"), "/host/c.txt");
        assert_eq!(normalize_slash("/host/./a//b"), "/host/a/b");
        assert_eq!(normalize_slash("/host/../../x"), "/x");
    }

    #[test]
    fn parent_of_url_path() {
        assert_eq!(parent_slash("/host/a/s.rhai"), "/host/a");
        assert_eq!(parent_slash("/host"), "/");
        assert_eq!(parent_slash("/"), "/");
    }
}
