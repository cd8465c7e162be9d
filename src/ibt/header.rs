//! Composite IBT header decoding.

use super::format::{
    DiskHeader, TelemetryHeader, VarBuffer, read_disk_header_with, read_telemetry_header,
    read_var_buffers, read_var_headers,
};
use crate::session::{SessionInfo, read_session_info};
use crate::{ByteSource, DecodeConfig, HeaderStage, Result, TelemetryError, VariableSchema};
use std::sync::Arc;
use tracing::{debug, warn};

/// Every header structure of one IBT source.
///
/// Everything except [`var_buffers`](Header::var_buffers) is fixed once decoded. For a live
/// source the slot table is re-read with [`Header::update_var_buffers`].
#[derive(Debug, Clone)]
pub struct Header {
    pub telemetry: TelemetryHeader,
    pub disk: DiskHeader,
    pub session: SessionInfo,
    pub variables: Arc<VariableSchema>,
    pub var_buffers: Vec<VarBuffer>,
}

impl Header {
    /// Names of every variable the source declares, in no particular order.
    pub fn available_vars(&self) -> Vec<String> {
        self.variables.names()
    }

    /// Re-read only the var buffer slot table.
    ///
    /// On failure the previous slot table is kept.
    pub fn update_var_buffers<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<()> {
        self.var_buffers = read_var_buffers(source, self.telemetry.num_buf)
            .map_err(|e| TelemetryError::header(HeaderStage::VarBuffer, e))?;
        Ok(())
    }

    /// Slot currently holding the highest tick count.
    pub fn latest_var_buffer(&self) -> Option<VarBuffer> {
        self.var_buffers.iter().copied().max_by_key(|b| b.tick_count)
    }
}

/// Decode every header of `source` with the default [`DecodeConfig`].
pub fn parse_headers<S: ByteSource + ?Sized>(source: &mut S) -> Result<Header> {
    parse_headers_with(source, &DecodeConfig::default())
}

/// Decode every header of `source`.
///
/// Stages run in file order: telemetry header, disk header, session info, variable headers,
/// var buffer slots. The first failing stage aborts the decode and is named in the error.
pub fn parse_headers_with<S: ByteSource + ?Sized>(
    source: &mut S,
    config: &DecodeConfig,
) -> Result<Header> {
    let telemetry = read_telemetry_header(source)
        .map_err(|e| TelemetryError::header(HeaderStage::Telemetry, e))?;

    let disk = read_disk_header_with(source, config)
        .map_err(|e| TelemetryError::header(HeaderStage::Disk, e))?;

    let session =
        read_session_info(source, telemetry.session_info_offset, telemetry.session_info_len)
            .map_err(|e| TelemetryError::header(HeaderStage::SessionInfo, e))?;

    // validate() has rejected negative counts and offsets.
    let variables = read_var_headers(
        source,
        telemetry.num_vars as usize,
        telemetry.var_header_offset as u64,
        telemetry.buf_len as usize,
    )
    .map_err(|e| TelemetryError::header(HeaderStage::VarHeader, e))?;

    let var_buffers = read_var_buffers(source, telemetry.num_buf)
        .map_err(|e| TelemetryError::header(HeaderStage::VarBuffer, e))?;

    debug!(
        "Parsed headers: {} variables, {} var buffers, {} recorded ticks",
        variables.variable_count(),
        var_buffers.len(),
        disk.record_count
    );

    if let Ok(len) = source.len() {
        check_record_count(&telemetry, &disk, len);
    }

    Ok(Header { telemetry, disk, session, variables: Arc::new(variables), var_buffers })
}

/// Warn when a completed recording holds fewer tick buffers than its disk header claims.
fn check_record_count(telemetry: &TelemetryHeader, disk: &DiskHeader, len: u64) -> bool {
    if telemetry.is_live() || telemetry.buf_len <= 0 {
        return true;
    }

    let buffers = len.saturating_sub(telemetry.buf_offset as u64) / telemetry.buf_len as u64;
    let complete = buffers >= disk.record_count.max(0) as u64;
    if !complete {
        warn!(
            "Recording declares {} ticks but only {} tick buffers are present",
            disk.record_count, buffers
        );
    }
    complete
}
