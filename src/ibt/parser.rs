//! Streaming tick parser
//!
//! Walks the fixed-size tick buffers that follow the headers, decoding the whitelisted
//! variables of one buffer per call. There is no length field to stop at: every step probes
//! the following buffer, and the stream ends once that probe finds too few bytes. The same
//! loop therefore serves completed files and files the simulator is still appending to.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use ibtstream::{FileSource, Parser, parse_headers};
//!
//! fn print_speeds() -> ibtstream::Result<()> {
//!     let mut source = FileSource::open("telemetry.ibt")?;
//!     let header = parse_headers(&mut source)?;
//!     let mut parser = Parser::new(source, &header, ["Speed"]);
//!
//!     loop {
//!         let (tick, has_next) = parser.next_tick();
//!         if let Some(tick) = tick {
//!             println!("{:?}", tick.get::<f32>("Speed"));
//!         }
//!         if !has_next {
//!             break;
//!         }
//!     }
//!     Ok(())
//! }
//! ```

use super::header::Header;
use super::value::read_var_value;
use crate::{ByteSource, SourceError, Tick, VariableSchema};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Whitelist entry that selects every variable.
pub const WILDCARD: &str = "*";

/// Tick index the parser starts at. Slot 0 is never yielded.
pub const FIRST_TICK_INDEX: u64 = 1;

/// Sequential tick decoder over one byte source.
#[derive(Debug)]
pub struct Parser<S> {
    source: S,
    variables: Arc<VariableSchema>,
    whitelist: Vec<String>,
    buf_len: usize,
    buf_offset: u64,
    current: u64,
    fault: Option<SourceError>,
}

impl<S: ByteSource> Parser<S> {
    /// Create a parser positioned at the first tick.
    ///
    /// An empty whitelist, or one containing `"*"`, selects every declared variable. Other
    /// names are kept as given; names the file does not declare decode as absent values.
    pub fn new<I, N>(source: S, header: &Header, whitelist: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let variables = Arc::clone(&header.variables);
        let whitelist = expand_whitelist(&variables, whitelist);
        debug!(
            "Parser created: {} whitelisted variables, buf_len={}, buf_offset={}",
            whitelist.len(),
            header.telemetry.buf_len,
            header.telemetry.buf_offset
        );

        Self {
            source,
            variables,
            whitelist,
            buf_len: header.telemetry.buf_len.max(0) as usize,
            buf_offset: header.telemetry.buf_offset.max(0) as u64,
            current: FIRST_TICK_INDEX,
            fault: None,
        }
    }

    /// Decode the tick at the current index and advance.
    ///
    /// Returns the tick and whether another one follows. Once the stream is exhausted this
    /// returns `(None, false)`. A read failure other than exhaustion closes the source and
    /// is kept in [`fault`](Parser::fault); the parser yields nothing afterwards.
    pub fn next_tick(&mut self) -> (Option<Tick>, bool) {
        let Some(buf) = self.read_slot(self.current) else {
            return (None, false);
        };

        let has_next = self.probe_slot(self.current + 1);
        let tick = self.decode(&buf);
        self.current += 1;

        (Some(tick), has_next)
    }

    /// Decode one tick at an absolute byte offset.
    ///
    /// Does not move the current index and does not probe ahead.
    pub fn parse_at(&mut self, offset: u64) -> Option<Tick> {
        let buf = self.read(offset)?;
        Some(self.decode(&buf))
    }

    /// Move the current index; the next [`next_tick`](Parser::next_tick) decodes `index`.
    pub fn seek(&mut self, index: u64) {
        debug!(from = self.current, to = index, "Parser seek");
        self.current = index;
    }

    /// Replace the variables decoded by subsequent calls.
    pub fn update_whitelist<I, N>(&mut self, names: I)
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.whitelist = expand_whitelist(&self.variables, names);
        debug!("Parser whitelist updated: {} variables", self.whitelist.len());
    }

    pub fn whitelist(&self) -> &[String] {
        &self.whitelist
    }

    /// Index of the tick the next call decodes.
    pub fn current(&self) -> u64 {
        self.current
    }

    /// The read error that stopped iteration, if it was not plain exhaustion.
    pub fn fault(&self) -> Option<&SourceError> {
        self.fault.as_ref()
    }

    pub fn take_fault(&mut self) -> Option<SourceError> {
        self.fault.take()
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    fn slot_offset(&self, index: u64) -> Option<u64> {
        index.checked_mul(self.buf_len as u64)?.checked_add(self.buf_offset)
    }

    fn read_slot(&mut self, index: u64) -> Option<Vec<u8>> {
        let offset = self.slot_offset(index)?;
        self.read(offset)
    }

    fn probe_slot(&mut self, index: u64) -> bool {
        let has_next = self.read_slot(index).is_some();
        trace!(index, has_next, "lookahead");
        has_next
    }

    fn read(&mut self, offset: u64) -> Option<Vec<u8>> {
        if self.buf_len == 0 || self.source.is_closed() {
            return None;
        }

        match self.source.read_vec_at(self.buf_len, offset) {
            Ok(buf) => Some(buf),
            Err(e) if e.is_exhausted() => None,
            Err(e) => {
                warn!("Closing source after read failure at offset {}: {}", offset, e);
                self.source.close();
                self.fault = Some(e);
                None
            }
        }
    }

    fn decode(&self, buf: &[u8]) -> Tick {
        let mut tick = Tick::with_capacity(self.whitelist.len());
        for name in &self.whitelist {
            let value = self.variables.get_variable(name).and_then(|var| read_var_value(buf, var));
            tick.insert(name.clone(), value);
        }
        tick
    }
}

impl<S: ByteSource> Iterator for Parser<S> {
    type Item = Tick;

    fn next(&mut self) -> Option<Tick> {
        self.next_tick().0
    }
}

fn expand_whitelist<I, N>(variables: &VariableSchema, names: I) -> Vec<String>
where
    I: IntoIterator<Item = N>,
    N: Into<String>,
{
    let names: Vec<String> = names.into_iter().map(Into::into).collect();
    if names.is_empty() || names.iter().any(|n| n == WILDCARD) {
        return variables.names();
    }
    names
}
