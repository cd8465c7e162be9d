//! Test utilities for building IBT byte images in memory
//!
//! [`IbtBuilder`] lays out a complete, valid IBT file (telemetry header, disk sub-header,
//! variable headers, session YAML and tick buffers) so tests and benchmarks do not depend
//! on recorded fixtures. Individual fields can be overridden to produce corrupt images.
//!
//! Tick buffer slot 0 is written as a zeroed reserved slot: a parser starts at index 1,
//! so the first tick passed to [`IbtBuilder::tick`] is the first one it yields.

#![cfg(any(test, feature = "benchmark"))]

use crate::ibt::format::{
    DISK_HEADER_OFFSET, TELEMETRY_HEADER_SIZE, VAR_BUFFER_BASE_OFFSET, VAR_BUFFER_STRIDE,
    VAR_HEADER_SIZE,
};
use crate::{BitField, Value, VariableType};

/// Recording start used by default: 2024-06-24 19:45:36 UTC.
pub const TEST_START_DATE: i64 = 1_719_258_336;

#[derive(Debug, Clone)]
struct TestVariable {
    name: String,
    data_type: VariableType,
    count: i32,
    offset: usize,
    description: String,
    unit: String,
    count_as_time: bool,
}

/// Fluent builder for synthetic IBT images.
///
/// ```rust,ignore
/// let bytes = IbtBuilder::new()
///     .variable("Speed", VariableType::Float32, 1)
///     .tick(&[("Speed", Value::Float(41.5))])
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct IbtBuilder {
    version: i32,
    status: i32,
    tick_rate: i32,
    session_info_update: i32,
    num_buf: i32,
    buf_len: Option<i32>,
    session: Vec<u8>,
    variables: Vec<TestVariable>,
    ticks: Vec<Vec<u8>>,
    start_date: i64,
    start_time: f64,
    end_time: f64,
    lap_count: i32,
    record_count: Option<i32>,
    var_buffers: [Option<(i32, i32)>; 4],
}

impl Default for IbtBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IbtBuilder {
    pub fn new() -> Self {
        Self {
            version: 2,
            status: 0,
            tick_rate: 60,
            session_info_update: 1,
            num_buf: 1,
            buf_len: None,
            session: Vec::new(),
            variables: Vec::new(),
            ticks: Vec::new(),
            start_date: TEST_START_DATE,
            start_time: 0.0,
            end_time: 120.0,
            lap_count: 0,
            record_count: None,
            var_buffers: [None; 4],
        }
    }

    pub fn version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    pub fn status(mut self, status: i32) -> Self {
        self.status = status;
        self
    }

    pub fn tick_rate(mut self, tick_rate: i32) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    pub fn num_buf(mut self, num_buf: i32) -> Self {
        self.num_buf = num_buf;
        self
    }

    /// Override the declared tick buffer length instead of deriving it from the variables.
    pub fn buf_len(mut self, buf_len: i32) -> Self {
        self.buf_len = Some(buf_len);
        self
    }

    pub fn start_date(mut self, start_date: i64) -> Self {
        self.start_date = start_date;
        self
    }

    pub fn session_times(mut self, start: f64, end: f64) -> Self {
        self.start_time = start;
        self.end_time = end;
        self
    }

    pub fn lap_count(mut self, lap_count: i32) -> Self {
        self.lap_count = lap_count;
        self
    }

    pub fn record_count(mut self, record_count: i32) -> Self {
        self.record_count = Some(record_count);
        self
    }

    /// Override one var buffer slot of the telemetry header.
    pub fn var_buffer(mut self, slot: usize, tick_count: i32, buf_offset: i32) -> Self {
        self.var_buffers[slot] = Some((tick_count, buf_offset));
        self
    }

    pub fn session_yaml(self, yaml: &str) -> Self {
        self.session_bytes(yaml.as_bytes().to_vec())
    }

    /// Raw session block, for encodings other than UTF-8.
    pub fn session_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.session = bytes;
        self
    }

    pub fn variable(self, name: &str, data_type: VariableType, count: i32) -> Self {
        self.variable_with(name, data_type, count, "", "")
    }

    /// Append a variable; offsets are assigned contiguously in declaration order.
    pub fn variable_with(
        mut self,
        name: &str,
        data_type: VariableType,
        count: i32,
        description: &str,
        unit: &str,
    ) -> Self {
        let offset = self.derived_buf_len();
        self.variables.push(TestVariable {
            name: name.to_string(),
            data_type,
            count,
            offset,
            description: description.to_string(),
            unit: unit.to_string(),
            count_as_time: false,
        });
        self
    }

    /// Append one tick. Variables not listed stay zeroed.
    ///
    /// # Panics
    ///
    /// Panics if a name was not declared or the value does not fit the declared layout.
    pub fn tick(mut self, values: &[(&str, Value)]) -> Self {
        let mut frame = vec![0u8; self.derived_buf_len()];
        for (name, value) in values {
            let var = self
                .variables
                .iter()
                .find(|v| v.name == *name)
                .unwrap_or_else(|| panic!("variable {name} was not declared"));
            let bytes = encode_value(value);
            frame[var.offset..var.offset + bytes.len()].copy_from_slice(&bytes);
        }
        self.ticks.push(frame);
        self
    }

    /// Append `count` ticks whose `name` variable holds `f(index)`.
    pub fn ticks_with(mut self, count: usize, name: &str, f: impl Fn(usize) -> Value) -> Self {
        for index in 0..count {
            self = self.tick(&[(name, f(index))]);
        }
        self
    }

    fn derived_buf_len(&self) -> usize {
        self.variables
            .iter()
            .map(|v| v.offset + v.data_type.size() * v.count.max(1) as usize)
            .max()
            .unwrap_or(0)
    }

    /// Declared length of one tick buffer.
    pub fn frame_size(&self) -> usize {
        self.buf_len.map_or_else(|| self.derived_buf_len(), |len| len.max(0) as usize)
    }

    pub fn var_header_offset(&self) -> usize {
        TELEMETRY_HEADER_SIZE + 32
    }

    pub fn session_info_offset(&self) -> usize {
        self.var_header_offset() + self.variables.len() * VAR_HEADER_SIZE
    }

    fn session_info_len(&self) -> usize {
        if self.session.is_empty() { 0 } else { self.session.len() + 1 }
    }

    /// Absolute offset of tick buffer slot 0.
    pub fn buf_offset(&self) -> usize {
        self.session_info_offset() + self.session_info_len()
    }

    /// Absolute offset of tick buffer slot `index`.
    pub fn slot_offset(&self, index: usize) -> usize {
        self.buf_offset() + index * self.frame_size()
    }

    pub fn build(&self) -> Vec<u8> {
        let frame_size = self.frame_size();
        let total = self.buf_offset() + (self.ticks.len() + 1) * frame_size;
        let mut out = vec![0u8; total];

        let put_i32 = |out: &mut Vec<u8>, at: usize, v: i32| {
            out[at..at + 4].copy_from_slice(&v.to_le_bytes());
        };

        put_i32(&mut out, 0, self.version);
        put_i32(&mut out, 4, self.status);
        put_i32(&mut out, 8, self.tick_rate);
        put_i32(&mut out, 12, self.session_info_update);
        put_i32(&mut out, 16, self.session_info_len() as i32);
        put_i32(&mut out, 20, self.session_info_offset() as i32);
        put_i32(&mut out, 24, self.variables.len() as i32);
        put_i32(&mut out, 28, self.var_header_offset() as i32);
        put_i32(&mut out, 32, self.num_buf);
        put_i32(&mut out, 36, frame_size as i32);

        let default_slot = (self.ticks.len() as i32 + 1, self.buf_offset() as i32);
        for (slot, custom) in self.var_buffers.iter().enumerate() {
            if slot >= self.num_buf.max(1) as usize && custom.is_none() {
                continue;
            }
            let (tick_count, buf_offset) = custom.unwrap_or(default_slot);
            let at = (VAR_BUFFER_BASE_OFFSET + slot as u64 * VAR_BUFFER_STRIDE) as usize;
            put_i32(&mut out, at, tick_count);
            put_i32(&mut out, at + 4, buf_offset);
        }

        let disk = DISK_HEADER_OFFSET as usize;
        out[disk..disk + 8].copy_from_slice(&self.start_date.to_le_bytes());
        out[disk + 8..disk + 16].copy_from_slice(&self.start_time.to_le_bytes());
        out[disk + 16..disk + 24].copy_from_slice(&self.end_time.to_le_bytes());
        put_i32(&mut out, disk + 24, self.lap_count);
        let record_count = self.record_count.unwrap_or(self.ticks.len().max(1) as i32);
        put_i32(&mut out, disk + 28, record_count);

        for (index, var) in self.variables.iter().enumerate() {
            let at = self.var_header_offset() + index * VAR_HEADER_SIZE;
            put_i32(&mut out, at, var.data_type.tag());
            put_i32(&mut out, at + 4, var.offset as i32);
            put_i32(&mut out, at + 8, var.count);
            out[at + 12] = u8::from(var.count_as_time);
            write_fixed(&mut out[at + 16..at + 48], &var.name);
            write_fixed(&mut out[at + 48..at + 112], &var.description);
            write_fixed(&mut out[at + 112..at + 144], &var.unit);
        }

        let session_at = self.session_info_offset();
        out[session_at..session_at + self.session.len()].copy_from_slice(&self.session);

        for (index, frame) in self.ticks.iter().enumerate() {
            let at = self.slot_offset(index + 1);
            let len = frame.len().min(frame_size);
            out[at..at + len].copy_from_slice(&frame[..len]);
        }

        out
    }
}

fn write_fixed(field: &mut [u8], text: &str) {
    let bytes = text.as_bytes();
    let len = bytes.len().min(field.len());
    field[..len].copy_from_slice(&bytes[..len]);
}

/// Encode a value into its little-endian wire bytes.
pub fn encode_value(value: &Value) -> Vec<u8> {
    fn flags(hex: &str) -> [u8; 4] {
        hex.parse::<BitField>().map(|b| b.value()).unwrap_or_default().to_le_bytes()
    }

    match value {
        Value::Char(v) => vec![*v],
        Value::Bool(v) => vec![u8::from(*v)],
        Value::Int(v) => v.to_le_bytes().to_vec(),
        Value::BitField(v) => flags(v).to_vec(),
        Value::Float(v) => v.to_le_bytes().to_vec(),
        Value::Double(v) => v.to_le_bytes().to_vec(),
        Value::CharArray(v) => v.clone(),
        Value::BoolArray(v) => v.iter().map(|b| u8::from(*b)).collect(),
        Value::IntArray(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        Value::BitFieldArray(v) => v.iter().flat_map(|x| flags(x)).collect(),
        Value::FloatArray(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        Value::DoubleArray(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
    }
}
