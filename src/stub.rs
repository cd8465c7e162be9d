//! Recordings ready for processing
//!
//! A [`Stub`] pairs a byte source with its decoded [`Header`]. Decoding headers up front lets
//! a caller inspect every recording (start time, sub-session) before any ticks are read and
//! lets the pipeline process several recordings in start-time order.

use crate::ibt::{Header, parse_headers};
use crate::{ByteSource, FileSource, Result, SessionInfo, TelemetryError};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::debug;

/// One recording with its headers decoded.
#[derive(Debug)]
pub struct Stub<S> {
    source: S,
    header: Header,
    name: String,
}

impl Stub<FileSource> {
    /// Open an IBT file and decode its headers.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = FileSource::open(path)?;
        Stub::new(source, path.display().to_string())
    }

    /// Open every file in order, stopping at the first failure.
    pub fn open_all<I, P>(paths: I) -> Result<Vec<Self>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        paths.into_iter().map(Stub::open).collect()
    }
}

impl<S: ByteSource> Stub<S> {
    /// Decode the headers of `source`. `name` identifies it in errors and logs.
    pub fn new(mut source: S, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let header =
            parse_headers(&mut source).map_err(|e| TelemetryError::in_file(name.as_str(), e))?;
        debug!(
            stub = %name,
            start = header.disk.start_date,
            records = header.disk.record_count,
            "Stub headers decoded"
        );
        Ok(Self { source, header, name })
    }
}

impl<S> Stub<S> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn session(&self) -> &SessionInfo {
        &self.header.session
    }

    /// Recording start from the disk header.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.header.disk.start()
    }

    /// Sub-session the recording belongs to.
    pub fn sub_session_id(&self) -> Option<i32> {
        self.header.session.sub_session_id()
    }

    /// Car index of the recording driver.
    pub fn driver_idx(&self) -> Option<i32> {
        self.header.session.driver_info.driver_car_idx
    }

    pub fn into_parts(self) -> (S, Header) {
        (self.source, self.header)
    }
}

/// Order stubs by recording start, keeping input order for equal starts.
pub fn sort_by_time<S>(stubs: &mut [Stub<S>]) {
    stubs.sort_by_key(|stub| stub.header.disk.start_date);
}
