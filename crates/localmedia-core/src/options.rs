//! Field configuration.
//!
//! One `FieldOptions` value is built per field declaration and owns that
//! field's destination, allow-list, naming transforms, derivative tokens,
//! and initial hook registrations. There is no shared state across fields.

use crate::derivative::{default_specs, DerivativeSpec};
use crate::error::{FieldError, FieldResult};
use crate::hooks::{PostMoveHook, PreMoveHook};
use crate::record::RecordStore;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Record-aware renaming function, applied on top of the date-prefixed
/// candidate name before collision checking.
pub trait RenameFn: Send + Sync {
    fn rename(&self, record: &dyn RecordStore, candidate: &str) -> String;
}

impl<F> RenameFn for F
where
    F: Fn(&dyn RecordStore, &str) -> String + Send + Sync,
{
    fn rename(&self, record: &dyn RecordStore, candidate: &str) -> String {
        self(record, candidate)
    }
}

/// Recognized options for an attachment field.
#[derive(Clone)]
pub struct FieldOptions {
    /// Destination directory for stored files.
    pub dest: PathBuf,
    /// MIME allow-list; `None` means unrestricted.
    pub allowed_types: Option<Vec<String>>,
    /// Optional chrono pattern; when set, stored names get a
    /// `<formatted-date>-` prefix.
    pub date_prefix: Option<String>,
    /// Optional record-aware rename function; its result supersedes the
    /// prefixed name.
    pub rename: Option<Arc<dyn RenameFn>>,
    /// Extra derivative tokens, appended after the default thumbnail spec.
    pub resample: Vec<String>,
    /// Hooks registered at field construction.
    pub pre_move: Vec<Arc<dyn PreMoveHook>>,
    pub post_move: Vec<Arc<dyn PostMoveHook>>,
    /// Path prefix stripped when building public hrefs.
    pub public_prefix: String,
    /// Initial-form usage; not supported, rejected at field construction.
    pub initial: bool,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            dest: PathBuf::from("public/assets"),
            allowed_types: None,
            date_prefix: None,
            rename: None,
            resample: Vec::new(),
            pre_move: Vec::new(),
            post_move: Vec::new(),
            public_prefix: "public/".to_string(),
            initial: false,
        }
    }
}

impl fmt::Debug for FieldOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldOptions")
            .field("dest", &self.dest)
            .field("allowed_types", &self.allowed_types)
            .field("date_prefix", &self.date_prefix)
            .field("rename", &self.rename.as_ref().map(|_| ".."))
            .field("resample", &self.resample)
            .field("pre_move", &self.pre_move.len())
            .field("post_move", &self.post_move.len())
            .field("public_prefix", &self.public_prefix)
            .field("initial", &self.initial)
            .finish()
    }
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dest(mut self, dest: impl Into<PathBuf>) -> Self {
        self.dest = dest.into();
        self
    }

    pub fn allowed_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    pub fn date_prefix(mut self, pattern: impl Into<String>) -> Self {
        self.date_prefix = Some(pattern.into());
        self
    }

    pub fn rename(mut self, rename: Arc<dyn RenameFn>) -> Self {
        self.rename = Some(rename);
        self
    }

    pub fn resample<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resample = tokens.into_iter().map(Into::into).collect();
        self
    }

    pub fn pre_move(mut self, hook: Arc<dyn PreMoveHook>) -> Self {
        self.pre_move.push(hook);
        self
    }

    pub fn post_move(mut self, hook: Arc<dyn PostMoveHook>) -> Self {
        self.post_move.push(hook);
        self
    }

    pub fn public_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.public_prefix = prefix.into();
        self
    }

    pub fn initial(mut self, initial: bool) -> Self {
        self.initial = initial;
        self
    }

    /// The field's ordered derivative set: the default thumbnail spec
    /// followed by any configured extras. Malformed or unsupported tokens
    /// fail here, at configuration time.
    pub fn specs(&self) -> FieldResult<Vec<DerivativeSpec>> {
        let mut specs = default_specs();
        for token in &self.resample {
            specs.push(DerivativeSpec::parse(token)?);
        }
        Ok(specs)
    }

    /// Check constraints that must hold before a field is constructed.
    pub fn validate(&self) -> FieldResult<()> {
        if self.initial {
            return Err(FieldError::Config(
                "attachment fields do not currently support being used as initial fields"
                    .to_string(),
            ));
        }
        self.specs()?;
        Ok(())
    }

    /// Whether a declared MIME type passes the allow-list.
    pub fn type_allowed(&self, content_type: &str) -> bool {
        match &self.allowed_types {
            Some(allowed) => allowed.iter().any(|t| t == content_type),
            None => true,
        }
    }
}
