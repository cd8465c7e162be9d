//! Telemetry variable schema types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::VariableType;

/// The decoded variable-header table of one IBT file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariableSchema {
    /// Map of variable names to their metadata (provides O(1) lookup)
    pub variables: HashMap<String, VariableInfo>,
    /// Size of one tick's data buffer in bytes
    pub frame_size: usize,
}

impl VariableSchema {
    /// Create a new VariableSchema with validation.
    pub fn new(variables: HashMap<String, VariableInfo>, frame_size: usize) -> crate::Result<Self> {
        let schema = Self { variables, frame_size };
        schema.validate()?;
        Ok(schema)
    }

    /// Validate that every variable fits inside one tick buffer.
    pub fn validate(&self) -> crate::Result<()> {
        for (name, var_info) in &self.variables {
            if var_info.name != *name {
                return Err(crate::TelemetryError::parse(
                    "variable header",
                    format!("map key '{}' doesn't match info name '{}'", name, var_info.name),
                ));
            }

            let end_offset = var_info.offset + var_info.byte_len();
            if end_offset > self.frame_size {
                return Err(crate::TelemetryError::parse(
                    "variable header",
                    format!(
                        "variable '{}' spans bytes {}..{} beyond the {} byte tick buffer",
                        name, var_info.offset, end_offset, self.frame_size
                    ),
                ));
            }
        }

        Ok(())
    }

    /// Get variable info by name (O(1) lookup).
    pub fn get_variable(&self, name: &str) -> Option<&VariableInfo> {
        self.variables.get(name)
    }

    /// Check if a variable exists.
    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Get the number of variables.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Names of every variable available in each tick, in no particular order.
    pub fn names(&self) -> Vec<String> {
        self.variables.keys().cloned().collect()
    }
}

/// Metadata for one telemetry variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableInfo {
    /// Variable name as defined by iRacing
    pub name: String,
    /// Wire type of each element
    pub data_type: VariableType,
    /// Byte offset within the tick buffer
    pub offset: usize,
    /// Number of elements (greater than 1 for arrays)
    pub count: usize,
    /// Whether the simulator treats the sample count as elapsed time
    pub count_as_time: bool,
    /// Units of measurement (e.g., "m/s", "C", "N*m")
    pub units: String,
    /// Human-readable description
    pub description: String,
}

impl VariableInfo {
    /// Whether values of this variable decode as a fixed-length sequence.
    pub fn is_array(&self) -> bool {
        self.count > 1
    }

    /// Bytes occupied in the tick buffer.
    pub fn byte_len(&self) -> usize {
        self.data_type.size() * self.count.max(1)
    }
}
