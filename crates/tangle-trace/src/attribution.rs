//! Mapping trace events to source files.
//!
//! An [`Attributor`] runs its [`PathRule`]s in order over an event's argument
//! bag and takes the first path-like string any rule finds.

use serde_json::{Map, Value};
use tangle_core::paths::looks_like_code_path;
use url::Url;

/// Argument names that usually carry a source file path, most specific first.
pub const DEFAULT_PATH_FIELDS: &[&str] = &[
    "path",
    "fileName",
    "file",
    "sourceFile",
    "filePath",
    "containingFileName",
    "resolvedFileName",
];

/// One strategy for pulling a file path out of an argument bag.
pub trait PathRule {
    fn find(&self, args: &Map<String, Value>) -> Option<String>;
}

/// Looks at a fixed list of field names, in order.
#[derive(Debug, Clone)]
pub struct FieldPriorityRule {
    fields: Vec<String>,
}

impl FieldPriorityRule {
    /// `extra_fields` are consulted before [`DEFAULT_PATH_FIELDS`].
    pub fn new(extra_fields: &[String]) -> Self {
        let mut fields: Vec<String> = Vec::new();
        let defaults = DEFAULT_PATH_FIELDS.iter().map(|f| f.to_string());
        for field in extra_fields.iter().cloned().chain(defaults) {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl PathRule for FieldPriorityRule {
    fn find(&self, args: &Map<String, Value>) -> Option<String> {
        self.fields
            .iter()
            .filter_map(|field| args.get(field).and_then(Value::as_str))
            .find_map(path_like)
    }
}

/// Scans every string in the bag, including nested objects and arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyValueRule;

impl AnyValueRule {
    fn scan(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => path_like(s),
            Value::Array(items) => items.iter().find_map(Self::scan),
            Value::Object(map) => map.values().find_map(Self::scan),
            _ => None,
        }
    }
}

impl PathRule for AnyValueRule {
    fn find(&self, args: &Map<String, Value>) -> Option<String> {
        args.values().find_map(Self::scan)
    }
}

/// Returns the path a string denotes if it looks like a source file.
///
/// `file://` URLs are converted to filesystem paths.
pub fn path_like(value: &str) -> Option<String> {
    let value = value.trim();
    if value.starts_with("file://") {
        let path = Url::parse(value).ok()?.to_file_path().ok()?;
        let path = path.to_string_lossy().into_owned();
        return looks_like_code_path(&path).then_some(path);
    }
    looks_like_code_path(value).then(|| value.to_string())
}

/// Ordered rule chain.
pub struct Attributor {
    rules: Vec<Box<dyn PathRule>>,
}

impl Attributor {
    pub fn new(rules: Vec<Box<dyn PathRule>>) -> Self {
        Self { rules }
    }

    /// Priority fields first, then a scan of every value.
    pub fn with_fields(extra_fields: &[String]) -> Self {
        Self::new(vec![
            Box::new(FieldPriorityRule::new(extra_fields)),
            Box::new(AnyValueRule),
        ])
    }

    pub fn attribute(&self, args: &Map<String, Value>) -> Option<String> {
        self.rules.iter().find_map(|rule| rule.find(args))
    }
}

impl Default for Attributor {
    fn default() -> Self {
        Self::with_fields(&[])
    }
}

impl std::fmt::Debug for Attributor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attributor")
            .field("rules", &self.rules.len())
            .finish()
    }
}
