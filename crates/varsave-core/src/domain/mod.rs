//! Domain module containing the variable model.

pub mod variable;

pub use variable::{InstanceId, ValueError, VarHandle, VarRecord, VarValue};
