//! Execution context: the only thing that mutates the target directory.
//!
//! Every side effect a script performs goes through one of the methods
//! here, in the order the script issues them. Nothing is batched or
//! deferred, so a failure leaves earlier writes in place.

pub mod console;
pub mod template;
pub mod workdir;

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::args::{self, ArgSpec, Resolution};
use crate::config::{KinoConfig, DEFAULT_GITIGNORE_BASE_URL};
use crate::error::{IoContext, KinoError, Result};
use crate::gitignore::{self, GitignoreExtras};
use crate::http::HttpClient;
use crate::source::path::{is_rooted, normalize};
use crate::source::Source;

/// Inline payload for [`Context::write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Bytes(Vec<u8>),
}

impl Content {
    fn into_bytes(self) -> Vec<u8> {
        match self {
            Content::Text(s) => s.into_bytes(),
            Content::Bytes(b) => b,
        }
    }
}

/// What to write and how. Exactly one of `content` and `source` must be set.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub content: Option<Content>,
    /// Companion path read through the bound [`Source`].
    pub source: Option<String>,
    /// Template arguments; when set the payload is rendered before writing.
    pub args: Option<Value>,
    /// Create missing parent directories first.
    pub mkdir: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            content: None,
            source: None,
            args: None,
            mkdir: true,
        }
    }
}

impl WriteOptions {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: Some(Content::Text(text.into())),
            ..Self::default()
        }
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            content: Some(Content::Bytes(bytes.into())),
            ..Self::default()
        }
    }

    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::default()
        }
    }

    pub fn with_args(mut self, args: Value) -> Self {
        self.args = Some(args);
        self
    }

    pub fn with_mkdir(mut self, mkdir: bool) -> Self {
        self.mkdir = mkdir;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Context {
    target_dir: PathBuf,
    source: Source,
    source_args: Vec<String>,
    allow_overwrite: bool,
    http: HttpClient,
    gitignore_base_url: String,
}

impl Context {
    /// `target_dir` must already exist as a directory.
    pub fn new(target_dir: &Path, source: Source, source_args: Vec<String>) -> Result<Context> {
        let absolute = std::path::absolute(target_dir)
            .io_context(|| format!("resolve target {}", target_dir.display()))?;
        let target_dir = normalize(&absolute);
        if !target_dir.is_dir() {
            return Err(KinoError::InvalidTarget(target_dir));
        }
        Ok(Context {
            target_dir,
            source,
            source_args,
            allow_overwrite: false,
            http: HttpClient::default(),
            gitignore_base_url: DEFAULT_GITIGNORE_BASE_URL.to_string(),
        })
    }

    pub fn allow_overwrite(mut self, allow: bool) -> Self {
        self.allow_overwrite = allow;
        self
    }

    pub fn with_config(mut self, cfg: &KinoConfig) -> Self {
        self.http = HttpClient::new(cfg.http.clone());
        self.gitignore_base_url = cfg.gitignore_base_url.clone();
        self
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Base name of the target directory.
    pub fn target_name(&self) -> String {
        self.target_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Unparsed command-line tail, in order.
    pub fn source_args(&self) -> &[String] {
        &self.source_args
    }

    /// Map a script path onto the target directory, refusing anything outside it.
    pub fn target_path(&self, path: &str) -> Result<PathBuf> {
        if is_rooted(path) {
            return Err(KinoError::OutsideTarget(path.to_string()));
        }
        let joined = normalize(&self.target_dir.join(path));
        if !joined.starts_with(&self.target_dir) {
            return Err(KinoError::OutsideTarget(path.to_string()));
        }
        Ok(joined)
    }

    fn write_bytes(&self, path: &str, data: &[u8], mkdir: bool) -> Result<PathBuf> {
        let dest = self.target_path(path)?;
        if dest == self.target_dir {
            return Err(KinoError::OutsideTarget(path.to_string()));
        }
        // A dangling symlink still counts as an existing entry.
        if !self.allow_overwrite && fs::symlink_metadata(&dest).is_ok() {
            return Err(KinoError::OverwriteConflict(dest));
        }
        if mkdir {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)
                    .io_context(|| format!("create directory {}", parent.display()))?;
            }
        }
        fs::write(&dest, data).io_context(|| format!("write {}", dest.display()))?;
        Ok(dest)
    }

    /// Write inline content or a companion file, optionally rendered as a template.
    pub fn write(&self, path: &str, opts: WriteOptions) -> Result<()> {
        let data = match (opts.content, opts.source) {
            (Some(content), None) => content.into_bytes(),
            (None, Some(source)) => self.source.read_bytes(&source)?,
            (None, None) => {
                return Err(KinoError::ContentType(format!(
                    "write {}: no content or source given",
                    path
                )))
            }
            (Some(_), Some(_)) => {
                return Err(KinoError::ContentType(format!(
                    "write {}: give either content or source, not both",
                    path
                )))
            }
        };

        let data = match &opts.args {
            Some(args) => {
                let text = String::from_utf8(data).map_err(|_| {
                    KinoError::ContentType(format!("write {}: template is not UTF-8 text", path))
                })?;
                template::render(&text, args)?.into_bytes()
            }
            None => data,
        };

        self.write_bytes(path, &data, opts.mkdir)?;
        console::action("write", path);
        Ok(())
    }

    /// Copy a companion file verbatim; `source` defaults to `path`.
    pub fn copy(&self, path: &str, source: Option<&str>, mkdir: bool) -> Result<()> {
        let from = source.unwrap_or(path);
        let data = self.source.read_bytes(from)?;
        self.write_bytes(path, &data, mkdir)?;
        if from == path {
            console::action("copy", path);
        } else {
            console::action("copy", &format!("{} <- {}", path, from));
        }
        Ok(())
    }

    /// Fetch an absolute external URL into `path`. Not resolved against the source.
    pub fn download(&self, path: &str, url: &str, mkdir: bool) -> Result<()> {
        let data = self.http.get(url)?;
        self.write_bytes(path, &data, mkdir)?;
        console::action("download", &format!("{} <- {}", path, url));
        Ok(())
    }

    /// Create `path` and any missing ancestors. Existing directories are fine.
    pub fn mkdir(&self, path: &str) -> Result<()> {
        let dir = self.target_path(path)?;
        fs::create_dir_all(&dir).io_context(|| format!("create directory {}", dir.display()))?;
        console::action("mkdir", path);
        Ok(())
    }

    pub fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.target_path(path)?.exists())
    }

    pub fn exists_source(&self, path: &str) -> Result<bool> {
        self.source.exists(path)
    }

    pub fn read(&self, path: &str) -> Result<Vec<u8>> {
        let file = self.target_path(path)?;
        fs::read(&file).io_context(|| format!("read {}", file.display()))
    }

    pub fn read_text(&self, path: &str) -> Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes)
            .map_err(|_| KinoError::ContentType(format!("read {}: not UTF-8 text", path)))
    }

    /// Remove a file or a whole directory tree. Missing paths are not an error.
    pub fn rm(&self, path: &str) -> Result<()> {
        let target = self.target_path(path)?;
        if target == self.target_dir {
            return Err(KinoError::OutsideTarget(path.to_string()));
        }
        let meta = match fs::symlink_metadata(&target) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(KinoError::io(format!("stat {}", target.display()), e)),
        };
        if meta.is_dir() {
            fs::remove_dir_all(&target)
                .io_context(|| format!("remove directory {}", target.display()))?;
        } else {
            fs::remove_file(&target).io_context(|| format!("remove {}", target.display()))?;
        }
        console::action("rm", path);
        Ok(())
    }

    /// Parse the command-line tail against `specs`.
    pub fn get_args(&self, specs: &[ArgSpec]) -> Result<Resolution> {
        args::resolve(specs, &self.source_args, &self.target_name())
    }

    pub fn log(&self, msg: &str) {
        console::info(msg);
    }

    pub fn log_error(&self, msg: &str) {
        console::error(msg);
    }

    /// GET an absolute URL. Non-2xx is an error.
    pub fn curl(&self, url: &str) -> Result<Vec<u8>> {
        self.http.get(url)
    }

    pub fn curl_text(&self, url: &str, strip: bool) -> Result<String> {
        let text = self.http.get_text(url)?;
        Ok(if strip { text.trim().to_string() } else { text })
    }

    pub fn curl_gitignore(&self, lang: &str, extras: GitignoreExtras) -> Result<String> {
        gitignore::fetch(&self.http, &self.gitignore_base_url, lang, extras)
    }
}

/// Serialize `value` as JSON. Pretty output is indented by two spaces.
pub fn to_json(value: &Value, pretty: bool, sort_keys: bool) -> Result<String> {
    let sorted;
    let value = if sort_keys {
        sorted = sort_object_keys(value);
        &sorted
    } else {
        value
    };
    let out = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    out.map_err(|e| KinoError::ContentType(format!("to_json: {}", e)))
}

fn sort_object_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_object_keys(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_object_keys).collect()),
        other => other.clone(),
    }
}
