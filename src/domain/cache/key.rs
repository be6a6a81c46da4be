//! Cache key derivation

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::CacheError;

/// Number of digest bytes kept in a key (128 bits)
const DIGEST_BYTES: usize = 16;

/// Default prefix tagging every key owned by the cache
pub const DEFAULT_KEY_PREFIX: &str = "cache";

/// Derived cache key, `"{prefix}:{namespace}:{digest}"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Returns the string representation of the key
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Scalar value allowed in a parameter set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    /// Infers a typed value from raw text (query strings, CLI flags)
    ///
    /// `true`/`false` become booleans, `null` becomes null, integers and
    /// finite decimals become numbers; everything else stays a string.
    pub fn infer(raw: &str) -> Self {
        match raw {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            "null" => return Self::Null,
            _ => {}
        }

        if let Ok(int) = raw.parse::<i64>() {
            return Self::Int(int);
        }

        match raw.parse::<f64>() {
            Ok(float) if float.is_finite() && raw.contains('.') => Self::Float(float),
            _ => Self::Str(raw.to_string()),
        }
    }

    fn from_json(name: &str, value: serde_json::Value) -> Result<Self, CacheError> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::Number(n) => match n.as_i64() {
                Some(int) => Ok(Self::Int(int)),
                None => n.as_f64().map(Self::Float).ok_or_else(|| {
                    CacheError::invalid_parameter(format!(
                        "Parameter '{}' is not a representable number",
                        name
                    ))
                }),
            },
            Value::String(s) => Ok(Self::Str(s)),
            Value::Array(_) | Value::Object(_) => Err(CacheError::invalid_parameter(format!(
                "Parameter '{}' must be a scalar value",
                name
            ))),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

/// Parameter set identifying a query within a namespace
///
/// Names are kept sorted, so insertion order never affects the derived key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheParams(BTreeMap<String, ParamValue>);

impl CacheParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    /// Creates parameters from a serializable value
    ///
    /// The value must serialize to a JSON object of scalars; `null` is taken
    /// as an empty parameter set.
    pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> Result<Self, CacheError> {
        let json = serde_json::to_value(value).map_err(|e| {
            CacheError::invalid_parameter(format!("Parameters are not serializable: {}", e))
        })?;

        match json {
            serde_json::Value::Null => Ok(Self::default()),
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(name, value)| {
                    let value = ParamValue::from_json(&name, value)?;
                    Ok((name, value))
                })
                .collect::<Result<BTreeMap<_, _>, CacheError>>()
                .map(Self),
            other => Err(CacheError::invalid_parameter(format!(
                "Parameters must be an object, got {}",
                json_kind(&other)
            ))),
        }
    }

    fn canonical_json(&self) -> Result<String, CacheError> {
        if let Some((name, _)) = self
            .0
            .iter()
            .find(|(_, v)| matches!(v, ParamValue::Float(f) if !f.is_finite()))
        {
            return Err(CacheError::invalid_parameter(format!(
                "Parameter '{}' must be a finite number",
                name
            )));
        }

        serde_json::to_string(&self.0).map_err(|e| {
            CacheError::invalid_parameter(format!("Parameters are not serializable: {}", e))
        })
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for CacheParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Turns `(namespace, params)` into stable cache keys
///
/// The digest is the first 128 bits of SHA-256 over
/// `namespace + ":" + canonical_json(params)`. The namespace also stays
/// readable in the key so substring invalidation can target it.
#[derive(Debug, Clone)]
pub struct KeyDeriver {
    prefix: String,
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

impl KeyDeriver {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Derives the key for a namespace and parameter set
    pub fn derive(&self, namespace: &str, params: &CacheParams) -> Result<CacheKey, CacheError> {
        if namespace.is_empty() {
            return Err(CacheError::invalid_parameter("Namespace must not be empty"));
        }

        let canonical = params.canonical_json()?;

        let mut hasher = Sha256::new();
        hasher.update(namespace.as_bytes());
        hasher.update(b":");
        hasher.update(canonical.as_bytes());
        let digest = hasher.finalize();

        Ok(CacheKey(format!(
            "{}:{}:{}",
            self.prefix,
            namespace,
            hex::encode(&digest[..DIGEST_BYTES])
        )))
    }

    /// Glob matching every key owned by this deriver
    pub fn prefix_pattern(&self) -> String {
        format!("{}:*", escape_glob(&self.prefix))
    }

    /// Glob matching owned keys whose text after the prefix contains `needle`
    pub fn substring_pattern(&self, needle: &str) -> String {
        format!("{}:*{}*", escape_glob(&self.prefix), escape_glob(needle))
    }

    /// Whether `key` is owned by this deriver and contains `needle` after the prefix
    pub fn key_contains(&self, key: &str, needle: &str) -> bool {
        key.strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix(':'))
            .is_some_and(|rest| rest.contains(needle))
    }
}

/// Escapes Redis glob metacharacters so text matches literally
pub fn escape_glob(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\' | '^') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}
