//! Streaming decoder for iRacing IBT telemetry files.
//!
//! IBT files hold the session YAML, a table of variable declarations and a run of
//! fixed-size tick buffers sampled at 60 Hz or more. This crate decodes the headers,
//! streams the ticks with only the variables you ask for, and fans each tick out to
//! several consumers in a single pass.
//!
//! # Features
//!
//! - **Header decoding**: validated telemetry and disk headers, variable table, session info
//! - **Selective decoding**: only whitelisted variables are read from each tick buffer
//! - **Growing files**: the same parser follows a file iRacing is still writing
//! - **Multi-consumer pipeline**: merged whitelists, per-consumer views, cooperative cancellation
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ibtstream::{FileSource, Parser, parse_headers};
//!
//! fn main() -> ibtstream::Result<()> {
//!     let mut source = FileSource::open("session.ibt")?;
//!     let header = parse_headers(&mut source)?;
//!     println!("Track: {}", header.session.weekend_info.track_name);
//!
//!     for tick in Parser::new(source, &header, ["Speed", "Gear"]) {
//!         println!("{:?} km/h in gear {:?}", tick.get::<f32>("Speed"), tick.get::<i32>("Gear"));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Example (several recordings, several consumers)
//!
//! ```rust,no_run
//! use ibtstream::{Processor, SessionInfo, Stub, Tick, process};
//! use tokio_util::sync::CancellationToken;
//!
//! struct LapCounter(i32);
//!
//! impl Processor for LapCounter {
//!     fn whitelist(&self) -> Vec<String> {
//!         vec!["Lap".into()]
//!     }
//!
//!     fn process(&mut self, tick: Tick, _has_next: bool, _session: &SessionInfo) -> anyhow::Result<()> {
//!         self.0 = self.0.max(tick.get::<i32>("Lap")?);
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> ibtstream::Result<()> {
//!     let stubs = Stub::open_all(["practice.ibt", "race.ibt"])?;
//!     let mut laps = LapCounter(0);
//!     process(&CancellationToken::new(), stubs, &mut [&mut laps])?;
//!     println!("Laps: {}", laps.0);
//!     Ok(())
//! }
//! ```

pub mod config;
mod error;
pub mod fifo;
pub mod ibt;
pub mod processor;
pub mod session;
pub mod source;
pub mod stub;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod tick;
pub mod types;

// Core exports
pub use config::DecodeConfig;
pub use error::*;
pub use source::{ByteSource, FileSource, MemorySource, SharedBuffer};
pub use tick::Tick;
pub use types::*;

// Decoding exports
pub use fifo::Store;
pub use ibt::{Header, LiveTicks, Parser, parse_headers, parse_headers_with};
pub use session::SessionInfo;

// Pipeline exports
pub use processor::{Processor, build_whitelist, process, process_stub, resolve_whitelist};
pub use stub::Stub;
