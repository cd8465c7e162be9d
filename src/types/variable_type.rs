//! Telemetry variable wire types

use serde::{Deserialize, Serialize};

/// The six value encodings an IBT variable header can declare.
/// Maps to iRacing SDK's irsdk_VarType enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum VariableType {
    /// Opaque single byte (irsdk_char)
    Char = 0,
    /// Boolean stored in one byte (irsdk_bool)
    Bool = 1,
    /// 32-bit signed integer (irsdk_int)
    Int32 = 2,
    /// 32-bit flags, surfaced as a `0x` hex string (irsdk_bitField)
    BitField = 3,
    /// 32-bit float (irsdk_float)
    Float32 = 4,
    /// 64-bit float (irsdk_double)
    Float64 = 5,
}

impl VariableType {
    /// Returns the size in bytes of one element of this type.
    /// Matches the irsdk_VarTypeBytes array from the iRacing SDK.
    pub const fn size(&self) -> usize {
        match self {
            VariableType::Char | VariableType::Bool => 1,
            VariableType::Int32 | VariableType::BitField | VariableType::Float32 => 4,
            VariableType::Float64 => 8,
        }
    }

    /// Wire tag as stored in the variable header.
    pub const fn tag(&self) -> i32 {
        *self as i32
    }
}

impl TryFrom<i32> for VariableType {
    type Error = i32;

    fn try_from(tag: i32) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(VariableType::Char),
            1 => Ok(VariableType::Bool),
            2 => Ok(VariableType::Int32),
            3 => Ok(VariableType::BitField),
            4 => Ok(VariableType::Float32),
            5 => Ok(VariableType::Float64),
            other => Err(other),
        }
    }
}
