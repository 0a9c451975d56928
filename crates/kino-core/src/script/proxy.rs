//! The restricted view of a [`Context`] that script code receives.
//!
//! `Proxy` is the whole capability surface: each permitted operation is an
//! explicit method here. Running another script, changing the working
//! directory and the context's internals have no counterpart.

use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

use crate::args::{ArgBag, ArgSpec, Resolution};
use crate::context::{self, console, Context, WriteOptions};
use crate::error::{KinoError, Result};
use crate::gitignore::GitignoreExtras;

#[derive(Clone)]
pub struct Proxy {
    ctx: Rc<Context>,
    /// First error raised through this proxy that aborted the script.
    aborted: Rc<RefCell<Option<KinoError>>>,
}

impl Proxy {
    pub(crate) fn new(ctx: Context) -> Self {
        Self {
            ctx: Rc::new(ctx),
            aborted: Rc::new(RefCell::new(None)),
        }
    }

    /// Record `err` as the reason the script stopped; returns its message.
    pub(crate) fn park(&self, err: KinoError) -> String {
        let msg = err.to_string();
        let mut slot = self.aborted.borrow_mut();
        if slot.is_none() {
            *slot = Some(err);
        }
        msg
    }

    pub(crate) fn take_parked(&self) -> Option<KinoError> {
        self.aborted.borrow_mut().take()
    }

    pub fn target_dir(&self) -> String {
        self.ctx.target_dir().display().to_string()
    }

    pub fn target_name(&self) -> String {
        self.ctx.target_name()
    }

    pub fn source_args(&self) -> Vec<String> {
        self.ctx.source_args().to_vec()
    }

    pub fn source_location(&self) -> String {
        self.ctx.source().location()
    }

    pub fn write(&self, path: &str, opts: WriteOptions) -> Result<()> {
        self.ctx.write(path, opts)
    }

    pub fn copy(&self, path: &str, source: Option<&str>, mkdir: bool) -> Result<()> {
        self.ctx.copy(path, source, mkdir)
    }

    pub fn download(&self, path: &str, url: &str, mkdir: bool) -> Result<()> {
        self.ctx.download(path, url, mkdir)
    }

    pub fn mkdir(&self, path: &str) -> Result<()> {
        self.ctx.mkdir(path)
    }

    pub fn exists(&self, path: &str) -> Result<bool> {
        self.ctx.exists(path)
    }

    pub fn exists_source(&self, path: &str) -> Result<bool> {
        self.ctx.exists_source(path)
    }

    pub fn read(&self, path: &str) -> Result<Vec<u8>> {
        self.ctx.read(path)
    }

    pub fn read_text(&self, path: &str) -> Result<String> {
        self.ctx.read_text(path)
    }

    pub fn rm(&self, path: &str) -> Result<()> {
        self.ctx.rm(path)
    }

    pub fn to_json(&self, value: &Value, pretty: bool, sort_keys: bool) -> Result<String> {
        context::to_json(value, pretty, sort_keys)
    }

    /// Resolve script arguments. A help request surfaces as
    /// [`KinoError::HelpRequested`], which ends the run successfully.
    pub fn get_args(&self, specs: &[ArgSpec]) -> Result<ArgBag> {
        match self.ctx.get_args(specs)? {
            Resolution::Args(bag) => Ok(bag),
            Resolution::Help(text) => Err(KinoError::HelpRequested(text)),
        }
    }

    pub fn log(&self, msg: &str, args: &[String]) {
        self.ctx.log(&console::format_message(msg, args));
    }

    pub fn log_error(&self, msg: &str, args: &[String]) {
        self.ctx.log_error(&console::format_message(msg, args));
    }

    pub fn curl(&self, url: &str) -> Result<Vec<u8>> {
        self.ctx.curl(url)
    }

    pub fn curl_text(&self, url: &str, strip: bool) -> Result<String> {
        self.ctx.curl_text(url, strip)
    }

    pub fn curl_gitignore(&self, lang: &str, extras: GitignoreExtras) -> Result<String> {
        self.ctx.curl_gitignore(lang, extras)
    }

    pub fn raise_error(&self, msg: &str) -> KinoError {
        KinoError::Script(msg.to_string())
    }
}
