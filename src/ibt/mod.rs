//! IBT binary format decoding
//!
//! An IBT file starts with a 112-byte telemetry header and a 32-byte disk sub-header,
//! followed by the variable header table, the session YAML block and a run of fixed-size
//! tick buffers. [`parse_headers`] decodes everything up to the tick buffers; [`Parser`]
//! then streams ticks and [`LiveTicks`] follows a file that is still being written.

pub mod endian;
pub mod format;
pub mod header;
pub mod live;
pub mod parser;
pub mod value;

pub use format::{DiskHeader, TelemetryHeader, VarBuffer};
pub use header::{Header, parse_headers, parse_headers_with};
pub use live::LiveTicks;
pub use parser::{FIRST_TICK_INDEX, Parser, WILDCARD};
pub use value::read_var_value;
