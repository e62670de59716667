//! The on-disk configuration file format.
//!
//! The artifact written by the save service is a UTF-8 text file that an
//! external load utility reads back at boot.  Its layout is fixed:
//!
//! ```text
//! @config User Settings
//!
//! /sys/name=alice
//! [3]/dev/temp=42
//! ```
//!
//! - The first line is a literal header comment, followed by a blank line.
//! - Each subsequent line is one saved variable: `name=value` for singleton
//!   variables, `[instance]name=value` when the instance qualifier is
//!   non-zero.
//! - Lines appear in registry enumeration order; this module imposes no
//!   ordering of its own.
//!
//! The byte layout is load-bearing: the load utility parses it verbatim, so
//! any change here is a compatibility break.

use crate::domain::variable::{ValueError, VarRecord};

/// The fixed file header, including the blank separator line.
pub const CONFIG_HEADER: &str = "@config User Settings\n\n";

/// Formats one variable record as a configuration file line, including the
/// trailing newline.
///
/// Textual values pass through verbatim; all other types are rendered via
/// [`crate::VarValue::to_text`].
///
/// # Errors
///
/// Returns [`ValueError`] when the value cannot be rendered as text (opaque
/// blobs).  Callers writing a whole file skip the record and continue.
pub fn config_line(record: &VarRecord) -> Result<String, ValueError> {
    let value = record.value.to_text()?;
    if record.instance.is_default() {
        Ok(format!("{}={}\n", record.name, value))
    } else {
        Ok(format!("[{}]{}={}\n", record.instance.0, record.name, value))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::variable::{InstanceId, VarValue};

    #[test]
    fn test_singleton_string_variable_has_no_bracket_prefix() {
        let record = VarRecord::singleton("/sys/name", VarValue::Str("alice".into()));
        assert_eq!(config_line(&record).unwrap(), "/sys/name=alice\n");
    }

    #[test]
    fn test_instance_qualified_integer_variable_gets_bracket_prefix() {
        let record = VarRecord {
            name: "/dev/temp".into(),
            instance: InstanceId(3),
            value: VarValue::Int(42),
        };
        assert_eq!(config_line(&record).unwrap(), "[3]/dev/temp=42\n");
    }

    #[test]
    fn test_zero_instance_never_emits_bracket_prefix() {
        let record = VarRecord {
            name: "/sys/mode".into(),
            instance: InstanceId(0),
            value: VarValue::Bool(false),
        };
        let line = config_line(&record).unwrap();
        assert!(!line.starts_with('['), "zero instance must not be bracketed");
        assert_eq!(line, "/sys/mode=false\n");
    }

    #[test]
    fn test_float_value_renders_canonically() {
        let record = VarRecord::singleton("/dev/voltage", VarValue::Float(3.3));
        assert_eq!(config_line(&record).unwrap(), "/dev/voltage=3.3\n");
    }

    #[test]
    fn test_opaque_value_line_fails() {
        let record = VarRecord::singleton("/dev/cert", VarValue::Opaque(vec![1, 2]));
        assert!(config_line(&record).is_err());
    }

    #[test]
    fn test_header_is_a_comment_line_plus_blank_line() {
        // The load utility depends on these exact bytes.
        assert_eq!(CONFIG_HEADER, "@config User Settings\n\n");
    }
}
