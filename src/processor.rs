//! Multi-consumer tick processing
//!
//! Several independent [`Processor`]s can share one decode pass over a recording. Their
//! whitelists are resolved against the recording's variables and merged, one [`Parser`]
//! decodes the union, and each processor receives every tick filtered back down to the
//! variables it asked for.
//!
//! ```rust
//! use ibtstream::{Processor, SessionInfo, Tick};
//!
//! #[derive(Default)]
//! struct TopSpeed {
//!     best: f32,
//! }
//!
//! impl Processor for TopSpeed {
//!     fn whitelist(&self) -> Vec<String> {
//!         vec!["Speed".to_string()]
//!     }
//!
//!     fn process(&mut self, tick: Tick, _has_next: bool, _session: &SessionInfo) -> anyhow::Result<()> {
//!         self.best = self.best.max(tick.get::<f32>("Speed")?);
//!         Ok(())
//!     }
//! }
//! ```
//!
//! Processors run one after another on the calling thread, in the order given. Cancellation
//! is checked before each tick is decoded; a processor that is mid-call is never interrupted.

use crate::ibt::{Parser, WILDCARD};
use crate::stub::{Stub, sort_by_time};
use crate::{ByteSource, Result, SessionInfo, TelemetryError, Tick, VariableSchema};
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// A consumer of decoded ticks.
pub trait Processor {
    /// Variables this processor needs. Empty, or containing `"*"`, requests every variable.
    ///
    /// Names the recording does not declare are dropped, so they never appear in the ticks
    /// passed to [`process`](Processor::process). Check [`Tick::contains`] before indexing a
    /// name the recording may lack.
    fn whitelist(&self) -> Vec<String>;

    /// Handle one tick. `has_next` is false for the last tick of a recording.
    fn process(&mut self, tick: Tick, has_next: bool, session: &SessionInfo) -> anyhow::Result<()>;
}

impl<P: Processor + ?Sized> Processor for &mut P {
    fn whitelist(&self) -> Vec<String> {
        (**self).whitelist()
    }

    fn process(&mut self, tick: Tick, has_next: bool, session: &SessionInfo) -> anyhow::Result<()> {
        (**self).process(tick, has_next, session)
    }
}

impl<P: Processor + ?Sized> Processor for Box<P> {
    fn whitelist(&self) -> Vec<String> {
        (**self).whitelist()
    }

    fn process(&mut self, tick: Tick, has_next: bool, session: &SessionInfo) -> anyhow::Result<()> {
        (**self).process(tick, has_next, session)
    }
}

/// Resolve one whitelist against the declared variables.
///
/// Names the recording does not declare are dropped. Empty or `"*"` selects every variable.
/// The result holds no duplicates and keeps the first-seen order of the input.
pub fn resolve_whitelist<I, N>(variables: &VariableSchema, names: I) -> Vec<String>
where
    I: IntoIterator<Item = N>,
    N: AsRef<str>,
{
    let names: Vec<N> = names.into_iter().collect();
    if names.is_empty() || names.iter().any(|n| n.as_ref() == WILDCARD) {
        return variables.names();
    }

    let mut seen = HashSet::with_capacity(names.len());
    names
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| variables.get_variable(name).is_some())
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Union of several resolved whitelists, without duplicates.
pub fn build_whitelist(resolved: &[Vec<String>]) -> Vec<String> {
    let mut seen = HashSet::new();
    resolved.iter().flatten().filter(|name| seen.insert(name.as_str())).cloned().collect()
}

/// Decode one recording and feed every tick to each processor.
///
/// Fails with [`TelemetryError::Cancelled`] if `cancel` fires before a tick is decoded,
/// with [`TelemetryError::Processor`] on the first processor failure, and with
/// [`TelemetryError::Source`] if a read fault ended the stream early.
pub fn process_stub<S, P>(cancel: &CancellationToken, stub: Stub<S>, processors: &mut [P]) -> Result<()>
where
    S: ByteSource,
    P: Processor,
{
    let name = stub.name().to_string();
    let (source, header) = stub.into_parts();

    let resolved: Vec<Vec<String>> =
        processors.iter().map(|p| resolve_whitelist(&header.variables, p.whitelist())).collect();
    let merged = build_whitelist(&resolved);

    info!(stub = %name, processors = processors.len(), variables = merged.len(), "Processing stub");
    let mut parser = Parser::new(source, &header, merged);

    let mut ticks = 0u64;
    loop {
        if cancel.is_cancelled() {
            info!(stub = %name, ticks, "Processing cancelled");
            return Err(TelemetryError::Cancelled);
        }

        let (tick, has_next) = parser.next_tick();
        let Some(tick) = tick else {
            break;
        };
        ticks += 1;

        for (processor, whitelist) in processors.iter_mut().zip(&resolved) {
            processor
                .process(tick.filter(whitelist), has_next, &header.session)
                .map_err(TelemetryError::Processor)?;
        }

        if !has_next {
            break;
        }
    }

    if let Some(fault) = parser.take_fault() {
        return Err(TelemetryError::in_file(name, TelemetryError::read_failed("tick data", fault)));
    }

    debug!(stub = %name, ticks, "Stub processed");
    Ok(())
}

/// Process several recordings in order of their start time.
///
/// The first failure stops the run; later recordings are not read.
pub fn process<S, P>(cancel: &CancellationToken, mut stubs: Vec<Stub<S>>, processors: &mut [P]) -> Result<()>
where
    S: ByteSource,
    P: Processor,
{
    sort_by_time(&mut stubs);
    for stub in stubs {
        process_stub(cancel, stub, processors)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{IbtBuilder, TEST_START_DATE};
    use crate::{MemorySource, SourceError, Value, VariableType};
    use anyhow::{Context, bail, ensure};
    use std::path::Path;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records every tick it is given.
    #[derive(Default)]
    struct Recorder {
        whitelist: Vec<String>,
        ticks: Vec<(Tick, bool)>,
        fail_at: Option<usize>,
    }

    impl Recorder {
        fn wanting(names: &[&str]) -> Self {
            Self { whitelist: names.iter().map(|n| n.to_string()).collect(), ..Self::default() }
        }
    }

    impl Processor for Recorder {
        fn whitelist(&self) -> Vec<String> {
            self.whitelist.clone()
        }

        fn process(&mut self, tick: Tick, has_next: bool, _session: &SessionInfo) -> anyhow::Result<()> {
            if self.fail_at == Some(self.ticks.len()) {
                bail!("recorder refused tick {}", self.ticks.len());
            }
            self.ticks.push((tick, has_next));
            Ok(())
        }
    }

    /// Cancels `token` while handling its `at`-th tick.
    struct Canceller {
        token: CancellationToken,
        at: usize,
        seen: usize,
    }

    impl Processor for Canceller {
        fn whitelist(&self) -> Vec<String> {
            vec!["Lap".into()]
        }

        fn process(&mut self, _tick: Tick, _has_next: bool, _session: &SessionInfo) -> anyhow::Result<()> {
            self.seen += 1;
            if self.seen == self.at {
                self.token.cancel();
            }
            Ok(())
        }
    }

    /// Counts reads and fails with an I/O error once `budget` runs out.
    struct MeteredSource {
        inner: MemorySource,
        reads: Arc<AtomicUsize>,
        budget: Arc<AtomicUsize>,
    }

    impl MeteredSource {
        fn new(bytes: Vec<u8>) -> Self {
            Self {
                inner: MemorySource::new(bytes),
                reads: Arc::new(AtomicUsize::new(0)),
                budget: Arc::new(AtomicUsize::new(usize::MAX)),
            }
        }
    }

    impl ByteSource for MeteredSource {
        fn read_exact_at(&mut self, buf: &mut [u8], offset: u64) -> Result<(), SourceError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.budget.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)).is_err() {
                return Err(SourceError::Io(std::io::Error::other("disk unplugged")));
            }
            self.inner.read_exact_at(buf, offset)
        }

        fn len(&mut self) -> Result<u64, SourceError> {
            self.inner.len()
        }

        fn close(&mut self) {
            self.inner.close()
        }

        fn is_closed(&self) -> bool {
            self.inner.is_closed()
        }
    }

    fn recording(start: i64, ticks: usize, base: f32) -> IbtBuilder {
        IbtBuilder::new()
            .start_date(start)
            .variable("Speed", VariableType::Float32, 1)
            .variable("RPM", VariableType::Float32, 1)
            .variable("Lap", VariableType::Int32, 1)
            .ticks_with(ticks, "Speed", move |i| Value::Float(base + i as f32))
    }

    fn stub(builder: IbtBuilder, name: &str) -> anyhow::Result<Stub<MemorySource>> {
        Stub::new(MemorySource::new(builder.build()), name).context("building stub")
    }

    fn keys(tick: &Tick) -> Vec<String> {
        let mut names: Vec<String> = tick.names().map(str::to_string).collect();
        names.sort();
        names
    }

    #[test]
    fn resolve_drops_unknown_and_expands_wildcard() -> anyhow::Result<()> {
        let stub = stub(recording(TEST_START_DATE, 1, 0.0), "r")?;
        let vars = &stub.header().variables;

        assert_eq!(resolve_whitelist(vars, ["Speed", "Nope", "Speed"]), vec!["Speed"]);
        let mut all = resolve_whitelist(vars, ["*", "Nope"]);
        all.sort();
        assert_eq!(all, vec!["Lap", "RPM", "Speed"]);
        assert_eq!(resolve_whitelist(vars, Vec::<String>::new()).len(), 3);
        assert!(resolve_whitelist(vars, ["Nope"]).is_empty());
        Ok(())
    }

    #[test]
    fn merged_decode_dispatches_each_processor_its_own_view() -> anyhow::Result<()> {
        let stub = stub(recording(TEST_START_DATE, 3, 100.0), "r")?;
        let vars = stub.header().variables.clone();

        let mut narrow = Recorder::wanting(&["Speed", "Gear"]);
        let mut wide = Recorder::wanting(&["*"]);

        let resolved =
            vec![resolve_whitelist(&vars, narrow.whitelist()), resolve_whitelist(&vars, wide.whitelist())];
        let mut merged = build_whitelist(&resolved);
        merged.sort();
        assert_eq!(merged, vec!["Lap", "RPM", "Speed"]);

        let mut processors: [&mut dyn Processor; 2] = [&mut narrow, &mut wide];
        process_stub(&CancellationToken::new(), stub, &mut processors)?;

        assert_eq!(narrow.ticks.len(), 3);
        for (tick, _) in &narrow.ticks {
            assert_eq!(keys(tick), vec!["Speed"]);
        }
        for (tick, _) in &wide.ticks {
            assert_eq!(keys(tick), vec!["Lap", "RPM", "Speed"]);
        }

        let flags: Vec<bool> = wide.ticks.iter().map(|(_, next)| *next).collect();
        assert_eq!(flags, vec![true, true, false]);
        assert_eq!(narrow.ticks[2].0.get::<f32>("Speed")?, 102.0);
        Ok(())
    }

    #[test]
    fn cancellation_before_start_invokes_nothing() -> anyhow::Result<()> {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut recorder = Recorder::wanting(&[]);
        let err = process_stub(&cancel, stub(recording(TEST_START_DATE, 5, 0.0), "r")?, &mut [&mut recorder])
            .unwrap_err();
        ensure!(err.is_cancelled(), "expected cancellation, got {err}");
        ensure!(recorder.ticks.is_empty());
        Ok(())
    }

    #[test]
    fn cancellation_during_a_tick_stops_before_the_next() -> anyhow::Result<()> {
        let token = CancellationToken::new();
        let mut canceller = Canceller { token: token.clone(), at: 2, seen: 0 };
        let mut recorder = Recorder::wanting(&["Speed"]);

        let first = MeteredSource::new(recording(TEST_START_DATE, 5, 0.0).build());
        let later = MeteredSource::new(recording(TEST_START_DATE + 60, 5, 0.0).build());
        let later_reads = Arc::clone(&later.reads);
        let stubs = vec![Stub::new(later, "later")?, Stub::new(first, "first")?];
        let reads_after_open = later_reads.load(Ordering::SeqCst);

        let mut processors: [&mut dyn Processor; 2] = [&mut canceller, &mut recorder];
        let err = process(&token, stubs, &mut processors).unwrap_err();

        ensure!(err.is_cancelled(), "expected cancellation, got {err}");
        ensure!(token.is_cancelled());
        // The tick that triggered cancellation still reaches every processor.
        assert_eq!(canceller.seen, 2);
        assert_eq!(recorder.ticks.len(), 2);
        assert_eq!(later_reads.load(Ordering::SeqCst), reads_after_open, "later recording was read");
        Ok(())
    }

    #[test]
    fn read_faults_fail_the_run_after_dispatching_earlier_ticks() -> anyhow::Result<()> {
        let source = MeteredSource::new(recording(TEST_START_DATE, 5, 10.0).build());
        let budget = Arc::clone(&source.budget);
        let stub = Stub::new(source, "flaky")?;

        // Tick 1, its lookahead and tick 2 succeed; the lookahead past tick 2 fails.
        budget.store(3, Ordering::SeqCst);
        let mut recorder = Recorder::wanting(&["Speed"]);
        let err = process_stub(&CancellationToken::new(), stub, &mut [&mut recorder]).unwrap_err();

        match &err {
            TelemetryError::InFile { path, source } => {
                assert_eq!(path, Path::new("flaky"));
                ensure!(
                    matches!(**source, TelemetryError::Source { source: SourceError::Io(_), .. }),
                    "unexpected inner error: {source}"
                );
            }
            other => bail!("expected a file-scoped read fault, got {other:?}"),
        }
        ensure!(err.to_string().starts_with("flaky: failed to read tick data: "), "{err}");

        let seen: Vec<(f32, bool)> = recorder
            .ticks
            .iter()
            .map(|(tick, next)| -> Result<(f32, bool)> { Ok((tick.get::<f32>("Speed")?, *next)) })
            .collect::<Result<_>>()?;
        assert_eq!(seen, vec![(10.0, true), (11.0, false)]);
        Ok(())
    }

    #[test]
    fn processor_errors_abort_the_run() -> anyhow::Result<()> {
        let mut first = Recorder { fail_at: Some(1), ..Recorder::wanting(&["Speed"]) };
        let mut second = Recorder::wanting(&["Speed"]);

        let stubs = vec![
            stub(recording(TEST_START_DATE, 4, 0.0), "a")?,
            stub(recording(TEST_START_DATE + 10, 4, 0.0), "b")?,
        ];
        let mut processors: [&mut dyn Processor; 2] = [&mut first, &mut second];
        let err = process(&CancellationToken::new(), stubs, &mut processors).unwrap_err();

        assert_eq!(err.to_string(), "recorder refused tick 1");
        ensure!(matches!(err, TelemetryError::Processor(_)));
        // The failing processor runs first, so the second never sees tick 1.
        assert_eq!(second.ticks.len(), 1);
        Ok(())
    }

    #[test]
    fn recordings_are_processed_in_start_order() -> anyhow::Result<()> {
        let stubs = vec![
            stub(recording(TEST_START_DATE + 3600, 2, 200.0), "second")?,
            stub(recording(TEST_START_DATE, 2, 100.0), "first")?,
        ];
        let mut recorder = Recorder::wanting(&["Speed"]);
        process(&CancellationToken::new(), stubs, &mut [&mut recorder])?;

        let speeds = recorder
            .ticks
            .iter()
            .map(|(tick, _)| tick.get::<f32>("Speed"))
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(speeds, vec![100.0, 101.0, 200.0, 201.0]);
        Ok(())
    }

    #[test]
    fn recording_without_ticks_dispatches_nothing() -> anyhow::Result<()> {
        let empty = IbtBuilder::new().variable("Speed", VariableType::Float32, 1);
        let mut recorder = Recorder::wanting(&["Speed"]);
        process_stub(&CancellationToken::new(), stub(empty, "empty")?, &mut [&mut recorder])?;
        ensure!(recorder.ticks.is_empty());
        Ok(())
    }

    #[test]
    fn unknown_only_whitelists_receive_empty_ticks() -> anyhow::Result<()> {
        let mut recorder = Recorder::wanting(&["Nope"]);
        process_stub(
            &CancellationToken::new(),
            stub(recording(TEST_START_DATE, 2, 0.0), "r")?,
            &mut [&mut recorder],
        )?;
        assert_eq!(recorder.ticks.len(), 2);
        ensure!(recorder.ticks.iter().all(|(tick, _)| tick.is_empty()));
        Ok(())
    }

    #[test]
    fn boxed_processors_work() -> anyhow::Result<()> {
        let mut processors: Vec<Box<dyn Processor>> = vec![Box::new(Recorder::wanting(&["Lap"]))];
        process_stub(&CancellationToken::new(), stub(recording(TEST_START_DATE, 1, 0.0), "r")?, &mut processors)?;
        Ok(())
    }
}
