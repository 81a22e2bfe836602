//! Spec fields: literal values or values derived from source metadata.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::image::Metadata;

/// Computes a field value from (possibly transformed) source metadata.
pub type DeriveFn = Arc<dyn Fn(&Metadata) -> Value + Send + Sync>;

/// Rewrites source metadata before any derived field sees it.
pub type MetaTransform = Arc<dyn Fn(&Metadata) -> Metadata + Send + Sync>;

/// One raw field of an output spec.
///
/// Literal values may be scalars or arrays; an array means "one variant per
/// element". Derived values are resolved eagerly before expansion and may
/// themselves return arrays.
#[derive(Clone)]
pub enum Field {
    Literal(Value),
    Derived(DeriveFn),
}

impl Field {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    pub fn derived(f: impl Fn(&Metadata) -> Value + Send + Sync + 'static) -> Self {
        Self::Derived(Arc::new(f))
    }

    /// Resolve against metadata, yielding a plain value.
    pub fn resolve(&self, meta: &Metadata) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Derived(f) => f(meta),
        }
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Derived(_) => f.write_str("Derived(<fn>)"),
        }
    }
}
