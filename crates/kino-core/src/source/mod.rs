//! Where a script lives, and where its companion files live.
//!
//! A script addresses companion files by paths relative to itself. The same
//! script works unchanged from a checkout on disk and from an HTTP server:
//! [`Source::resolve`] maps the relative path onto the script's origin.

pub mod path;

use std::fmt;
use std::fs;
use std::path::PathBuf;

use crate::error::{IoContext, KinoError, Result};
use crate::http::HttpClient;

const FILE_PREFIX: &str = "file://";

/// Script location on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalSource {
    script: PathBuf,
    dir: PathBuf,
}

/// Script location behind an HTTP(S) URL.
///
/// `dir` is the "virtual directory": the URL with its scheme prefix
/// (`http:/` or `https:/`) stripped, parent path only, e.g. `/host/tpl`
/// for `http://host/tpl/app.kino.rhai`.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    url: String,
    prefix: &'static str,
    dir: String,
    authority: String,
    http: HttpClient,
}

#[derive(Debug, Clone)]
pub enum Source {
    Local(LocalSource),
    Remote(RemoteSource),
}

impl Source {
    /// Pick the variant by sniffing `location`.
    ///
    /// `http://` and `https://` are remote. Everything else is a local path,
    /// with an optional `file://` prefix; a missing file is only reported
    /// when it is first read.
    pub fn new(location: &str, http: HttpClient) -> Result<Source> {
        if is_url(location) {
            Ok(Source::Remote(RemoteSource::new(location, http)?))
        } else {
            Ok(Source::Local(LocalSource::new(location)?))
        }
    }

    /// The script's own location: absolute path or URL.
    pub fn location(&self) -> String {
        match self {
            Source::Local(s) => s.script.display().to_string(),
            Source::Remote(s) => s.url.clone(),
        }
    }

    /// Full script text.
    pub fn read_script(&self) -> Result<String> {
        match self {
            Source::Local(s) => {
                let bytes = fs::read(&s.script)
                    .io_context(|| format!("read script {}", s.script.display()))?;
                String::from_utf8(bytes).map_err(|e| {
                    KinoError::Script(format!("{} is not UTF-8: {}", s.script.display(), e))
                })
            }
            Source::Remote(s) => s.http.get_text(&s.url),
        }
    }

    /// Map a companion path onto the script's origin.
    ///
    /// Absolute paths are rejected for both variants.
    pub fn resolve(&self, relative: &str) -> Result<String> {
        if path::is_rooted(relative) {
            return Err(KinoError::OutsideOrigin(relative.to_string()));
        }
        match self {
            Source::Local(s) => Ok(s.resolve(relative).display().to_string()),
            Source::Remote(s) => s.resolve(relative),
        }
    }

    /// Resolve then fetch the companion file's bytes.
    pub fn read_bytes(&self, relative: &str) -> Result<Vec<u8>> {
        let resolved = self.resolve(relative)?;
        match self {
            Source::Local(_) => fs::read(&resolved).io_context(|| format!("read {}", resolved)),
            Source::Remote(s) => s.http.get(&resolved),
        }
    }

    /// Resolve then probe for the companion file.
    pub fn exists(&self, relative: &str) -> Result<bool> {
        let resolved = self.resolve(relative)?;
        match self {
            Source::Local(_) => Ok(PathBuf::from(resolved).exists()),
            Source::Remote(s) => s.http.head_ok(&resolved),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location())
    }
}

impl LocalSource {
    fn new(location: &str) -> Result<Self> {
        let raw = location.strip_prefix(FILE_PREFIX).unwrap_or(location);
        let absolute = std::path::absolute(raw)
            .io_context(|| format!("resolve script path {}", raw))?;
        let script = path::normalize(&absolute);
        let dir = script
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| script.clone());
        Ok(Self { script, dir })
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        path::normalize(&self.dir.join(relative))
    }

    pub fn script_path(&self) -> &std::path::Path {
        &self.script
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

impl RemoteSource {
    fn new(location: &str, http: HttpClient) -> Result<Self> {
        let invalid = || KinoError::InvalidSourceLocation(location.to_string());
        let prefix = if location.starts_with("https://") {
            "https:/"
        } else if location.starts_with("http://") {
            "http:/"
        } else {
            return Err(invalid());
        };

        let parsed = url::Url::parse(location).map_err(|_| invalid())?;
        let host = parsed.host_str().filter(|h| !h.is_empty()).ok_or_else(invalid)?;
        let authority = match parsed.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let dir = path::normalize_slash(&format!(
            "/{}{}",
            authority,
            path::parent_slash(parsed.path())
        ));

        Ok(Self {
            url: location.to_string(),
            prefix,
            dir,
            authority,
            http,
        })
    }

    fn resolve(&self, relative: &str) -> Result<String> {
        let joined = path::normalize_slash(&format!("{}/{}", self.dir, relative));
        let stays_on_host = joined
            .trim_start_matches('/')
            .split('/')
            .next()
            .is_some_and(|first| first == self.authority);
        if !stays_on_host {
            return Err(KinoError::OutsideOrigin(relative.to_string()));
        }
        let resolved = format!("{}{}", self.prefix, joined);
        url::Url::parse(&resolved)
            .map_err(|_| KinoError::InvalidSourceLocation(resolved.clone()))?;
        Ok(resolved)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn virtual_dir(&self) -> &str {
        &self.dir
    }
}

pub fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}
