//! The variable model shared by the daemon and the registry wire protocol.
//!
//! The registry server owns the live variables; varsave only ever *reads*
//! them.  A [`VarRecord`] is one enumerated snapshot of a dirty variable:
//! its name, its optional instance qualifier, and its typed value.  The
//! dirty flag itself never appears here — the registry filters by it before
//! records reach this process, and varsave never clears it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque handle identifying a variable inside the registry.
///
/// Handles are resolved from names once (at startup for the trigger
/// variable) and are only meaningful for the lifetime of one registry
/// connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VarHandle(pub u32);

/// Optional instance qualifier distinguishing multiple value slots that
/// share one variable name.
///
/// Zero is the default and means "no instance" (a singleton variable).  A
/// singleton never emits a bracketed prefix in the configuration file; any
/// non-zero instance always does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

impl InstanceId {
    /// The singleton (no-instance) qualifier.
    pub const NONE: InstanceId = InstanceId(0);

    /// Returns `true` for the zero/default qualifier.
    pub fn is_default(self) -> bool {
        self.0 == 0
    }
}

/// Error type for value-to-text conversion.
#[derive(Debug, Error)]
pub enum ValueError {
    /// Opaque byte values have no canonical textual form.
    #[error("opaque value has no textual representation")]
    OpaqueValue,
}

/// A typed variable value.
///
/// The enum discriminant doubles as the registry type tag: the wire
/// protocol serializes it as `{"type": "Int", "value": 42}` and the daemon
/// matches on the variant to decide whether a value is already textual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum VarValue {
    /// A UTF-8 string value.  Already textual; written out verbatim.
    Str(String),
    /// A signed integer value.
    Int(i64),
    /// A floating point value.
    Float(f64),
    /// A boolean value.
    Bool(bool),
    /// An opaque byte blob.  Cannot be rendered into the text format.
    Opaque(Vec<u8>),
}

impl VarValue {
    /// Returns `true` if the value is natively textual and needs no
    /// conversion before being written to the configuration file.
    pub fn is_textual(&self) -> bool {
        matches!(self, VarValue::Str(_))
    }

    /// Renders the value into its canonical textual representation.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::OpaqueValue`] for opaque blobs, which have no
    /// text form.  Callers saving a whole variable set are expected to skip
    /// the offending record and keep going.
    pub fn to_text(&self) -> Result<String, ValueError> {
        match self {
            VarValue::Str(s) => Ok(s.clone()),
            VarValue::Int(i) => Ok(i.to_string()),
            VarValue::Float(f) => Ok(f.to_string()),
            VarValue::Bool(b) => Ok(b.to_string()),
            VarValue::Opaque(_) => Err(ValueError::OpaqueValue),
        }
    }
}

/// One enumerated dirty variable, as yielded by the registry's
/// first/next cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarRecord {
    /// Fully qualified variable name, e.g. `/sys/name`.
    pub name: String,
    /// Instance qualifier; defaults to the singleton qualifier when absent
    /// from the wire representation.
    #[serde(default)]
    pub instance: InstanceId,
    /// The typed value at enumeration time.
    pub value: VarValue,
}

impl VarRecord {
    /// Convenience constructor for a singleton (no-instance) record.
    pub fn singleton(name: impl Into<String>, value: VarValue) -> Self {
        Self {
            name: name.into(),
            instance: InstanceId::NONE,
            value,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
