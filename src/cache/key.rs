//! Cache Key Module
//!
//! Derives deterministic keys from producer identity and call arguments.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::Error as _;
use serde::Serialize;
use serde_json::Value;

use crate::cache::encode::{encode, EncodeError};
use crate::error::CacheError;

// == Keyword Arguments ==
#[derive(Debug, Clone, PartialEq)]
struct Kwarg {
    value: Value,
    token: String,
}

/// Named call arguments.
///
/// Stored sorted by name, so the order arguments were added in never
/// affects the derived key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kwargs(BTreeMap<String, Kwarg>);

impl Kwargs {
    /// Creates an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named argument, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Serialize) -> Result<Self, CacheError> {
        self.insert(name, value)?;
        Ok(self)
    }

    /// Adds or replaces a named argument.
    ///
    /// The value must also be representable as JSON, since producers read
    /// keyword arguments back through [`Kwargs::get`].
    pub fn insert(&mut self, name: impl Into<String>, value: impl Serialize) -> Result<(), CacheError> {
        let token = encode(&value).map_err(CacheError::KeyEncoding)?;
        let value = serde_json::to_value(&value)
            .map_err(|err| CacheError::KeyEncoding(EncodeError::custom(err)))?;
        self.0.insert(name.into(), Kwarg { value, token });
        Ok(())
    }

    /// Returns a named argument.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).map(|kwarg| &kwarg.value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn encoded(&self) -> Result<String, CacheError> {
        let mut out = String::from("{");
        for (name, kwarg) in &self.0 {
            out.push_str(&encode(name.as_str()).map_err(CacheError::KeyEncoding)?);
            out.push_str(&kwarg.token);
        }
        out.push('}');
        Ok(out)
    }
}

// == Cache Key ==
/// Identifies one logical call: producer name plus canonical argument encodings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    producer: String,
    args: String,
    kwargs: String,
}

impl CacheKey {
    /// Derives the key for a call.
    ///
    /// Encodings are type-tagged, so `None`, `NaN` and the infinities all
    /// produce distinct keys, and maps are written in sorted key order.
    pub fn derive<A>(producer: &str, args: &A, kwargs: &Kwargs) -> Result<Self, CacheError>
    where
        A: Serialize + ?Sized,
    {
        Ok(Self {
            producer: producer.to_string(),
            args: encode(args).map_err(CacheError::KeyEncoding)?,
            kwargs: kwargs.encoded()?,
        })
    }

    /// Producer name this key belongs to.
    pub fn producer(&self) -> &str {
        &self.producer
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", self.producer, self.args, self.kwargs)
    }
}
