//! Variable value decoding from a raw tick buffer.

use super::endian::{byte4_to_bitfield, byte4_to_float, byte4_to_int, byte8_to_double};
use crate::{Value, VariableInfo, VariableType};

/// Decode one variable from the bytes of exactly one tick buffer.
///
/// A count above 1 yields the matching array variant with `count` elements in wire order;
/// otherwise a single element is decoded at the variable's offset. `Char` scalars are the
/// raw byte. Returns `None` when the variable's span does not fit in `buf`.
pub fn read_var_value(buf: &[u8], var: &VariableInfo) -> Option<Value> {
    let width = var.data_type.size();
    let raw = buf.get(var.offset..var.offset.checked_add(var.byte_len())?)?;

    if var.is_array() {
        let elements = raw.chunks_exact(width);
        let value = match var.data_type {
            VariableType::Char => Value::CharArray(raw.to_vec()),
            VariableType::Bool => Value::BoolArray(raw.iter().map(|&b| b > 0).collect()),
            VariableType::Int32 => Value::IntArray(elements.map(byte4_to_int).collect()),
            VariableType::BitField => {
                Value::BitFieldArray(elements.map(byte4_to_bitfield).collect())
            }
            VariableType::Float32 => Value::FloatArray(elements.map(byte4_to_float).collect()),
            VariableType::Float64 => Value::DoubleArray(elements.map(byte8_to_double).collect()),
        };
        return Some(value);
    }

    Some(match var.data_type {
        VariableType::Char => Value::Char(raw[0]),
        VariableType::Bool => Value::Bool(raw[0] > 0),
        VariableType::Int32 => Value::Int(byte4_to_int(raw)),
        VariableType::BitField => Value::BitField(byte4_to_bitfield(raw)),
        VariableType::Float32 => Value::Float(byte4_to_float(raw)),
        VariableType::Float64 => Value::Double(byte8_to_double(raw)),
    })
}
