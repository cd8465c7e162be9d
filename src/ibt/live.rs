//! Polling reader for sources that are being written while read
//!
//! While recording, iRacing rotates the newest sample through the var buffer slots of the
//! telemetry header. [`LiveTicks`] re-reads that slot table on every poll, decodes the slot
//! with the highest tick count and remembers recently delivered tick counts so the same
//! sample is never returned twice.

use super::header::Header;
use super::parser::Parser;
use crate::fifo::Store;
use crate::{ByteSource, Result, TelemetryError, Tick};
use tracing::{debug, trace};

/// Deduplicating reader of the newest var buffer slot.
#[derive(Debug)]
pub struct LiveTicks<S> {
    parser: Parser<S>,
    header: Header,
    seen: Store<i32>,
}

impl<S: ByteSource> LiveTicks<S> {
    /// `capacity` bounds how many recent tick counts are remembered; zero selects the
    /// default of 10.
    pub fn new<I, N>(source: S, header: Header, whitelist: I, capacity: usize) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let parser = Parser::new(source, &header, whitelist);
        let seen = Store::new(capacity);
        debug!(
            "Live reader created: {} slots, remembering {} tick counts",
            header.var_buffers.len(),
            seen.capacity()
        );
        Self { parser, header, seen }
    }

    /// Decode the newest sample if it has not been delivered yet.
    ///
    /// Returns `Ok(None)` when the newest slot still holds an already delivered tick count
    /// or its buffer is not fully written yet.
    pub fn poll(&mut self) -> Result<Option<Tick>> {
        self.header.update_var_buffers(self.parser.source_mut())?;

        let Some(latest) = self.header.latest_var_buffer() else {
            return Ok(None);
        };
        if !self.seen.add(latest.tick_count) {
            trace!(tick_count = latest.tick_count, "no new sample");
            return Ok(None);
        }

        match self.parser.parse_at(latest.buf_offset as u64) {
            Some(tick) => Ok(Some(tick)),
            None => {
                // Let the next poll retry a slot that was not readable yet.
                self.seen.delete(&latest.tick_count);
                match self.parser.take_fault() {
                    Some(fault) => Err(TelemetryError::read_failed("live tick data", fault)),
                    None => Ok(None),
                }
            }
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Tick counts delivered most recently, oldest first.
    pub fn recent_tick_counts(&self) -> Vec<i32> {
        self.seen.keys()
    }

    pub fn update_whitelist<I, N>(&mut self, names: I)
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.parser.update_whitelist(names);
    }

    pub fn into_source(self) -> S {
        self.parser.into_source()
    }
}
