//! IBT sub-header layouts and their decoders
//!
//! An IBT file opens with a set of fixed-offset structures:
//!
//! 1. **Telemetry header** (112 bytes at offset 0) - `irsdk_header` compatible fields
//! 2. **Disk sub-header** (32 bytes at offset 112) - recording start and record counts
//! 3. **Variable headers** - `numVars` entries of 144 bytes at `varHeaderOffset`
//! 4. **Var buffer slots** - up to four `(tickCount, bufOffset)` pairs inside the telemetry
//!    header, starting at byte 48 with a 16 byte stride
//!
//! Each decoder reads its span through a [`ByteSource`], slices fields with the
//! [`endian`](super::endian) helpers and validates the result. Nothing is defaulted: a field
//! outside its valid range rejects the file.

use super::endian::{byte4_to_int, byte8_to_double, byte8_to_int64, bytes_to_string, trim_nul};
use crate::{
    ByteSource, DecodeConfig, Result, TelemetryError, VariableInfo, VariableSchema, VariableType,
};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace};

pub const TELEMETRY_HEADER_SIZE: usize = 112;
pub const DISK_HEADER_OFFSET: u64 = TELEMETRY_HEADER_SIZE as u64;
pub const DISK_HEADER_SIZE: usize = 32;
pub const VAR_HEADER_SIZE: usize = 144;
pub const VAR_BUFFER_BASE_OFFSET: u64 = 48;
pub const VAR_BUFFER_STRIDE: u64 = 16;
/// Slots the telemetry header has room for (`IRSDK_MAX_BUFS`).
pub const MAX_VAR_BUFFERS: i32 = 4;

const VAR_NAME: std::ops::Range<usize> = 16..48;
const VAR_DESC: std::ops::Range<usize> = 48..112;
const VAR_UNIT: std::ops::Range<usize> = 112..144;

/// Upper bound for the disk header's relative session times.
const MAX_SESSION_TIME: f64 = 1e20;

/// IBT telemetry header (the leading fields of iRacing's `irsdk_header`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryHeader {
    pub version: i32,
    /// 1 while the simulator is connected and writing, 0 for a completed file
    pub status: i32,
    /// Samples per second
    pub tick_rate: i32,
    /// Incremented every time the session YAML is rewritten
    pub session_info_update: i32,
    pub session_info_len: i32,
    pub session_info_offset: i32,
    pub num_vars: i32,
    pub var_header_offset: i32,
    pub num_buf: i32,
    /// Byte length of one tick buffer
    pub buf_len: i32,
    /// Byte offset of the first tick buffer
    pub buf_offset: i32,
}

impl TelemetryHeader {
    pub const SIZE: usize = TELEMETRY_HEADER_SIZE;

    /// Decode the header fields from its 112 raw bytes.
    pub fn from_bytes(bytes: &[u8; TELEMETRY_HEADER_SIZE]) -> Self {
        Self {
            version: byte4_to_int(&bytes[0..4]),
            status: byte4_to_int(&bytes[4..8]),
            tick_rate: byte4_to_int(&bytes[8..12]),
            session_info_update: byte4_to_int(&bytes[12..16]),
            session_info_len: byte4_to_int(&bytes[16..20]),
            session_info_offset: byte4_to_int(&bytes[20..24]),
            num_vars: byte4_to_int(&bytes[24..28]),
            var_header_offset: byte4_to_int(&bytes[28..32]),
            num_buf: byte4_to_int(&bytes[32..36]),
            buf_len: byte4_to_int(&bytes[36..40]),
            buf_offset: byte4_to_int(&bytes[52..56]),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let supported = self.version == 2
            && (0..=1).contains(&self.status)
            && (60..=360).contains(&self.tick_rate);

        // Negative sizes or offsets can only come from a corrupted header.
        let sane = self.num_vars >= 0
            && self.var_header_offset >= 0
            && self.session_info_len >= 0
            && self.session_info_offset >= 0
            && self.buf_len >= 0
            && self.buf_offset >= 0;

        if !supported || !sane {
            return Err(TelemetryError::parse(
                "telemetry header",
                format!("values received: {:?}", self),
            ));
        }
        Ok(())
    }

    /// True while the simulator is still writing to the source.
    pub fn is_live(&self) -> bool {
        self.status == 1
    }
}

/// IBT disk sub-header
/// struct irsdk_diskSubHeader {
///   time_t sessionStartDate;   // 8 bytes (i64)
///   double sessionStartTime;   // 8 bytes (f64)
///   double sessionEndTime;     // 8 bytes (f64)
///   int sessionLapCount;       // 4 bytes (i32)
///   int sessionRecordCount;    // 4 bytes (i32)
/// }
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiskHeader {
    pub start_date: i64,   // unix timestamp
    pub start_time: f64,   // seconds since session start
    pub end_time: f64,     // seconds since session start
    pub lap_count: i32,    // laps completed
    pub record_count: i32, // ticks recorded
}

impl DiskHeader {
    pub const SIZE: usize = DISK_HEADER_SIZE;

    pub fn from_bytes(bytes: &[u8; DISK_HEADER_SIZE]) -> Self {
        Self {
            start_date: byte8_to_int64(&bytes[0..8]),
            start_time: byte8_to_double(&bytes[8..16]),
            end_time: byte8_to_double(&bytes[16..24]),
            lap_count: byte4_to_int(&bytes[24..28]),
            record_count: byte4_to_int(&bytes[28..32]),
        }
    }

    /// Recording start as a UTC timestamp, if the raw value is representable.
    pub fn start(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.start_date, 0)
    }

    pub fn validate(&self, config: &DecodeConfig) -> Result<()> {
        let times_valid = (0.0..=MAX_SESSION_TIME).contains(&self.start_time)
            && (0.0..=MAX_SESSION_TIME).contains(&self.end_time);

        if !times_valid || self.record_count == 0 {
            return Err(TelemetryError::parse(
                "disk header",
                format!("values received: {:?}", self),
            ));
        }

        // A shifted read produces wildly wrong dates long before any other field looks odd.
        let (earliest, latest) = config.year_bounds();
        match self.start() {
            Some(start) if (earliest..=latest).contains(&start.year()) => Ok(()),
            Some(start) => Err(TelemetryError::parse(
                "StartDate",
                format!("{} is outside {}..={}", start, earliest, latest),
            )),
            None => Err(TelemetryError::parse(
                "StartDate",
                format!("{} is not a valid timestamp", self.start_date),
            )),
        }
    }
}

/// One live data buffer slot from the telemetry header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarBuffer {
    /// Tick counter of the sample currently held in this slot
    pub tick_count: i32,
    /// Absolute byte offset of the slot's tick buffer
    pub buf_offset: i32,
}

impl VarBuffer {
    pub fn is_valid(&self) -> bool {
        self.tick_count != 0 && self.buf_offset != 0
    }
}

/// Read and validate the telemetry header at offset 0.
pub fn read_telemetry_header<S: ByteSource + ?Sized>(source: &mut S) -> Result<TelemetryHeader> {
    trace!("Reading telemetry header ({} bytes)", TELEMETRY_HEADER_SIZE);
    let mut bytes = [0u8; TELEMETRY_HEADER_SIZE];
    source
        .read_exact_at(&mut bytes, 0)
        .map_err(|e| TelemetryError::read_failed("telemetry header", e))?;

    let header = TelemetryHeader::from_bytes(&bytes);
    header.validate()?;

    debug!(
        "Parsed telemetry header: version={}, tick_rate={}, num_vars={}, buf_len={}",
        header.version, header.tick_rate, header.num_vars, header.buf_len
    );
    Ok(header)
}

/// Read and validate the disk sub-header with the default plausibility window.
pub fn read_disk_header<S: ByteSource + ?Sized>(source: &mut S) -> Result<DiskHeader> {
    read_disk_header_with(source, &DecodeConfig::default())
}

/// Read and validate the disk sub-header at offset 112.
pub fn read_disk_header_with<S: ByteSource + ?Sized>(
    source: &mut S,
    config: &DecodeConfig,
) -> Result<DiskHeader> {
    let mut bytes = [0u8; DISK_HEADER_SIZE];
    source
        .read_exact_at(&mut bytes, DISK_HEADER_OFFSET)
        .map_err(|e| TelemetryError::read_failed("disk header", e))?;

    let header = DiskHeader::from_bytes(&bytes);
    header.validate(config)?;

    debug!(
        "Parsed disk header: start_date={}, laps={}, records={}",
        header.start_date, header.lap_count, header.record_count
    );
    Ok(header)
}

/// Read `num_vars` variable headers starting at `offset`.
///
/// Every variable must declare a known wire type, a non-negative offset and count, and a
/// UTF-8 name. When `frame_size` is non-zero each variable must also fit inside one tick
/// buffer; a zero frame size means the file carries no tick data to decode.
pub fn read_var_headers<S: ByteSource + ?Sized>(
    source: &mut S,
    num_vars: usize,
    offset: u64,
    frame_size: usize,
) -> Result<VariableSchema> {
    debug!("Reading {} variable headers at offset {}", num_vars, offset);

    let table_len = num_vars.checked_mul(VAR_HEADER_SIZE).ok_or_else(|| {
        TelemetryError::parse("variable header", format!("{} variables overflow", num_vars))
    })?;
    let table = source
        .read_vec_at(table_len, offset)
        .map_err(|e| TelemetryError::read_failed("variable header", e))?;

    let mut variables = HashMap::with_capacity(num_vars);
    for (index, entry) in table.chunks_exact(VAR_HEADER_SIZE).enumerate() {
        let Some(info) = decode_var_header(index, entry)? else {
            continue;
        };
        variables.insert(info.name.clone(), info);
    }

    debug!("Extracted {} variables with frame size {}", variables.len(), frame_size);
    if frame_size == 0 {
        return Ok(VariableSchema { variables, frame_size });
    }
    VariableSchema::new(variables, frame_size)
}

fn decode_var_header(index: usize, entry: &[u8]) -> Result<Option<VariableInfo>> {
    let tag = byte4_to_int(&entry[0..4]);
    let offset = byte4_to_int(&entry[4..8]);
    let count = byte4_to_int(&entry[8..12]);

    let name = std::str::from_utf8(trim_nul(&entry[VAR_NAME]))
        .map_err(|e| {
            TelemetryError::parse("vars", format!("invalid name at item {}: {}", index, e))
        })?
        .to_string();

    if name.is_empty() {
        trace!("Skipping unnamed variable header {}", index);
        return Ok(None);
    }

    let data_type = VariableType::try_from(tag).map_err(|tag| {
        TelemetryError::parse(
            "vars",
            format!("unknown variable type {} for '{}' at item {}", tag, name, index),
        )
    })?;

    if offset < 0 || count < 0 {
        return Err(TelemetryError::parse(
            "vars",
            format!("'{}' at item {} has offset {} and count {}", name, index, offset, count),
        ));
    }

    Ok(Some(VariableInfo {
        name,
        data_type,
        offset: offset as usize,
        count: count as usize,
        count_as_time: entry[12] != 0,
        units: bytes_to_string(&entry[VAR_UNIT]),
        description: bytes_to_string(&entry[VAR_DESC]),
    }))
}

/// Read the first `num_buf` var buffer slots from the telemetry header.
pub fn read_var_buffers<S: ByteSource + ?Sized>(
    source: &mut S,
    num_buf: i32,
) -> Result<Vec<VarBuffer>> {
    if !(1..=MAX_VAR_BUFFERS).contains(&num_buf) {
        return Err(TelemetryError::parse(
            "VarBuffer headers",
            format!("slot count {} outside 1..={}", num_buf, MAX_VAR_BUFFERS),
        ));
    }

    let mut buffers = Vec::with_capacity(num_buf as usize);
    for slot in 0..num_buf as u64 {
        let mut bytes = [0u8; 8];
        source
            .read_exact_at(&mut bytes, VAR_BUFFER_BASE_OFFSET + slot * VAR_BUFFER_STRIDE)
            .map_err(|e| TelemetryError::read_failed(format!("VarBuffer header {}", slot), e))?;

        let buffer = VarBuffer {
            tick_count: byte4_to_int(&bytes[0..4]),
            buf_offset: byte4_to_int(&bytes[4..8]),
        };
        if !buffer.is_valid() {
            return Err(TelemetryError::parse(
                "VarBuffer headers",
                format!("slot {}: {:?}", slot, buffer),
            ));
        }
        trace!(slot, tick_count = buffer.tick_count, buf_offset = buffer.buf_offset, "var buffer");
        buffers.push(buffer);
    }

    Ok(buffers)
}
