//! `.gitignore` assembly: a language file from the github/gitignore
//! collection plus editor/OS fragments.

use crate::error::{KinoError, Result};
use crate::http::HttpClient;

pub const MACOS: &str = "
### macOS ###
.DS_Store
.AppleDouble
.LSOverride
._*
.Spotlight-V100
.Trashes
";

pub const INTELLIJ_IDEA: &str = "
### IntelliJ IDEA ###
.idea/
*.iml
*.ipr
*.iws
out/
";

pub const VSCODE: &str = "
### VS Code ###
.vscode/*
!.vscode/settings.json
!.vscode/tasks.json
!.vscode/launch.json
!.vscode/extensions.json
";

pub const NETBEANS: &str = "
### NetBeans ###
/nbproject/private/
/nbbuild/
/dist/
/nbdist/
/.nb-gradle/
";

/// Which fragments get appended after the language file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GitignoreExtras {
    pub mac_os: bool,
    pub intellij_idea: bool,
    pub vscode: bool,
    pub netbeans: bool,
}

impl Default for GitignoreExtras {
    fn default() -> Self {
        Self {
            mac_os: true,
            intellij_idea: true,
            vscode: true,
            netbeans: false,
        }
    }
}

pub fn gitignore_url(base_url: &str, lang: &str) -> Result<String> {
    let lang = lang.trim();
    if lang.is_empty() {
        return Err(KinoError::Argument("no language for .gitignore".to_string()));
    }
    Ok(format!("{}/{}.gitignore", base_url.trim_end_matches('/'), lang))
}

/// Append the enabled fragments to `base`.
pub fn compose(mut base: String, extras: GitignoreExtras) -> String {
    for (enabled, fragment) in [
        (extras.mac_os, MACOS),
        (extras.intellij_idea, INTELLIJ_IDEA),
        (extras.vscode, VSCODE),
        (extras.netbeans, NETBEANS),
    ] {
        if enabled {
            base.push_str(fragment);
        }
    }
    base
}

/// Fetch the language file and append the fragments.
pub fn fetch(http: &HttpClient, base_url: &str, lang: &str, extras: GitignoreExtras) -> Result<String> {
    let url = gitignore_url(base_url, lang)?;
    let base = http.get_text(&url)?;
    Ok(compose(base, extras))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_for_language() {
        assert_eq!(
            gitignore_url("https://raw.example.com/gitignore/", "Java").unwrap(),
            "https://raw.example.com/gitignore/Java.gitignore"
        );
    }

    #[test]
    fn empty_language_rejected() {
        assert!(matches!(
            gitignore_url("https://x", "  "),
            Err(KinoError::Argument(_))
        ));
    }

    #[test]
    fn default_extras_skip_netbeans() {
        let out = compose("*.class\n".to_string(), GitignoreExtras::default());
        assert!(out.starts_with("*.class\n"));
        assert!(out.contains(".DS_Store"));
        assert!(out.contains(".idea/"));
        assert!(out.contains(".vscode/*"));
        assert!(!out.contains("nbproject"));
    }

    #[test]
    fn all_extras_off() {
        let extras = GitignoreExtras {
            mac_os: false,
            intellij_idea: false,
            vscode: false,
            netbeans: false,
        };
        assert_eq!(compose("target/\n".to_string(), extras), "target/\n");
    }
}
