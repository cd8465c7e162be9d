//! Core types for telemetry data representation.
//!
//! - [`VariableType`] maps to iRacing's `irsdk_VarType` tags with element sizes
//! - [`VariableInfo`] / [`VariableSchema`] describe the variable-header table
//! - [`Value`] holds one decoded scalar or array
//! - [`FromValue`] provides typed extraction used by [`Tick::get`](crate::Tick::get)
//! - [`BitField`] converts bitfield variables between hex strings and flags
//!
//! ```rust
//! use ibtstream::types::{BitField, FromValue, Value};
//!
//! let flags = Value::BitField("0x10040200".to_string());
//! let bits = BitField::from_value(&flags).unwrap();
//! assert!(bits.has_flag(0x0000_0200));
//! assert_eq!(bits.to_string(), "0x10040200");
//! ```

mod bitfield;
mod schema;
mod value;
mod variable_type;

pub use bitfield::BitField;
pub use schema::{VariableInfo, VariableSchema};
pub use value::{FromValue, Value};
pub use variable_type::VariableType;
