//! # Conformance Comparator
//!
//! Runs the engine against a [`SignedTrace`] one clock at a time and reports
//! the first cycle where the model's bus activity differs from the recorded
//! chip.
//!
//! ## Comparison Rules
//!
//! For each trace record the engine ticks once, then:
//!
//! 1. An explicit cycle index (`c=`) must equal the model's cycle counter.
//! 2. RWB must match.
//! 3. Inside the reset preamble nothing else is checked: those cycles depend
//!    on what the chip was doing before reset.
//! 4. The address must match.
//! 5. Data is compared when the record carries `d`. A model write against a
//!    record without `d` is a divergence, since the chip's driven value was
//!    not captured.
//! 6. SYNC, VPB and MLB are compared when the record carries them.
//!
//! A model idling after STP or WAI keeps putting its idle reads on the bus,
//! and those are compared like any other cycle. A mismatch on an idle cycle
//! means the chip kept running where the model did not, and is reported as a
//! stall.
//!
//! ## Batch Runs
//!
//! [`run_directory`] checks every `*.log` in a directory against the `*.bin`
//! with the same stem and keeps going past failures. Setup problems (bad
//! signature, wrong image, missing file) are reported apart from genuine
//! divergences.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

use crate::bus::{BusCycle, BusFlags};
use crate::cpu::CPU;
use crate::memory::{MapError, MemoryConfig, MemoryImage};
use crate::trace::{image_checksum, SignedTrace, TraceRecord, TraceVerifier, VerificationError};
use crate::DecodeError;

/// Cycles at the start of a trace that are checked for direction only.
pub const DEFAULT_RESET_PREAMBLE: usize = 6;

/// Comparator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparatorConfig {
    /// Memory policy for the environment built from the program image.
    pub memory: MemoryConfig,
    /// Number of leading records checked for direction only.
    pub reset_preamble: usize,
}

impl Default for ComparatorConfig {
    fn default() -> Self {
        Self {
            memory: MemoryConfig::default(),
            reset_preamble: DEFAULT_RESET_PREAMBLE,
        }
    }
}

/// A run that could not produce a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConformanceError {
    #[error("trace {trace} has no InputSha256 header")]
    MissingInputChecksum { trace: String },

    #[error("program image does not match the trace: expected {expected}, got {actual}")]
    InputMismatch { expected: String, actual: String },

    #[error("{0}")]
    Decode(#[from] DecodeError),

    #[error("cannot build memory from program image: {0}")]
    Image(#[from] MapError),
}

/// A bus field the comparator checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Address,
    Direction,
    Data,
    Sync,
    VectorPull,
    MemoryLock,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Field::Address => "address",
            Field::Direction => "rwb",
            Field::Data => "data",
            Field::Sync => "sync",
            Field::VectorPull => "vpb",
            Field::MemoryLock => "mlb",
        };
        f.write_str(name)
    }
}

/// Why the model and the trace disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DivergenceKind {
    /// A recorded field differs from the model's.
    Field(Field),
    /// The model wrote but the record carries no data to compare with.
    MissingData,
    /// The model is idling in STP or WAI while the trace shows activity.
    ModelStalled,
    /// The record's explicit cycle index differs from the model's.
    OutOfSync,
}

impl fmt::Display for DivergenceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DivergenceKind::Field(field) => write!(f, "{} mismatch", field),
            DivergenceKind::MissingData => f.write_str("model wrote but the trace has no data"),
            DivergenceKind::ModelStalled => f.write_str("model idle (STP/WAI) while the trace continues"),
            DivergenceKind::OutOfSync => f.write_str("cycle index out of sync"),
        }
    }
}

/// The first point where the model left the trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
    /// Model cycle index at the divergence.
    pub cycle: u64,
    /// Trace file line of the offending record.
    pub line: usize,
    pub kind: DivergenceKind,
    pub expected: TraceRecord,
    /// What the model put on the bus.
    pub actual: BusCycle,
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "line {} (cycle {}): {}: expected `{}`, model `{}`",
            self.line, self.cycle, self.kind, self.expected, self.actual
        )
    }
}

/// Result of comparing one trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConformanceVerdict {
    pub trace_id: String,
    /// Records that matched before the run ended.
    pub cycles_compared: usize,
    pub divergence: Option<Divergence>,
}

impl ConformanceVerdict {
    pub fn passed(&self) -> bool {
        self.divergence.is_none()
    }
}

impl fmt::Display for ConformanceVerdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.divergence {
            None => write!(f, "{}: pass ({} cycles)", self.trace_id, self.cycles_compared),
            Some(divergence) => write!(f, "{}: fail at {}", self.trace_id, divergence),
        }
    }
}

/// Replays signed traces against fresh engines.
#[derive(Debug, Clone, Default)]
pub struct Comparator {
    config: ComparatorConfig,
}

impl Comparator {
    pub fn new(config: ComparatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ComparatorConfig {
        &self.config
    }

    /// Compares `trace` against a model running `image`.
    ///
    /// The image is checked against the trace's `InputSha256` header before
    /// the engine is built. The engine starts from power-on reset.
    pub fn run(
        &self,
        trace: &SignedTrace,
        image: &[u8],
    ) -> Result<ConformanceVerdict, ConformanceError> {
        let expected = trace
            .input_sha256()
            .ok_or_else(|| ConformanceError::MissingInputChecksum {
                trace: trace.id().to_string(),
            })?;
        let actual = image_checksum(image);
        if expected != actual {
            return Err(ConformanceError::InputMismatch {
                expected: expected.to_string(),
                actual,
            });
        }

        let memory = MemoryImage::from_image(image, self.config.memory)?;
        let mut cpu = CPU::new(memory);
        let mut compared = 0;

        for (index, record) in trace.records().iter().enumerate() {
            let idle = cpu.is_stopped() || cpu.is_waiting();
            let cycle = cpu.tick()?;
            if let Some(kind) = self.compare(index, record, &cycle) {
                let kind = if idle { DivergenceKind::ModelStalled } else { kind };
                return Ok(self.verdict(
                    trace,
                    compared,
                    Some(Divergence {
                        cycle: cycle.cycle,
                        line: record.line,
                        kind,
                        expected: record.clone(),
                        actual: cycle,
                    }),
                ));
            }
            compared += 1;
        }

        Ok(self.verdict(trace, compared, None))
    }

    fn verdict(
        &self,
        trace: &SignedTrace,
        cycles_compared: usize,
        divergence: Option<Divergence>,
    ) -> ConformanceVerdict {
        match &divergence {
            Some(divergence) => debug!("{}: {}", trace.id(), divergence),
            None => debug!("{}: {} cycles match", trace.id(), cycles_compared),
        }
        ConformanceVerdict {
            trace_id: trace.id().to_string(),
            cycles_compared,
            divergence,
        }
    }

    fn compare(&self, index: usize, record: &TraceRecord, cycle: &BusCycle) -> Option<DivergenceKind> {
        if let Some(expected) = record.cycle {
            if expected != cycle.cycle {
                return Some(DivergenceKind::OutOfSync);
            }
        }
        if record.direction != cycle.direction {
            return Some(DivergenceKind::Field(Field::Direction));
        }
        if index < self.config.reset_preamble {
            return None;
        }
        if record.address != cycle.address {
            return Some(DivergenceKind::Field(Field::Address));
        }

        match record.data {
            Some(data) if data != cycle.data => return Some(DivergenceKind::Field(Field::Data)),
            None if cycle.is_write() => return Some(DivergenceKind::MissingData),
            _ => {}
        }

        let (recorded, asserted) = record.recorded_flags();
        for (flag, field) in [
            (BusFlags::SYNC, Field::Sync),
            (BusFlags::VECTOR_PULL, Field::VectorPull),
            (BusFlags::MEMORY_LOCK, Field::MemoryLock),
        ] {
            if recorded.contains(flag) && asserted.contains(flag) != cycle.flags.contains(flag) {
                return Some(DivergenceKind::Field(field));
            }
        }
        None
    }
}

// ========== Batch Runs ==========

/// A trace that could not be compared because its inputs are unusable.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error("failed to read program image {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Conformance(ConformanceError),
}

/// Outcome of one trace in a batch.
#[derive(Debug)]
pub enum TraceOutcome {
    Pass(ConformanceVerdict),
    Fail(ConformanceVerdict),
    /// The model hit an opcode it has no program for.
    Aborted(DecodeError),
    BadSetup(SetupError),
}

impl TraceOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, TraceOutcome::Pass(_))
    }

    pub fn is_bad_setup(&self) -> bool {
        matches!(self, TraceOutcome::BadSetup(_))
    }
}

/// Outcome counts for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub passed: usize,
    pub failed: usize,
    pub aborted: usize,
    pub bad_setup: usize,
}

impl BatchSummary {
    pub fn from_outcomes<'a, I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = &'a TraceOutcome>,
    {
        let mut summary = Self::default();
        for outcome in outcomes {
            match outcome {
                TraceOutcome::Pass(_) => summary.passed += 1,
                TraceOutcome::Fail(_) => summary.failed += 1,
                TraceOutcome::Aborted(_) => summary.aborted += 1,
                TraceOutcome::BadSetup(_) => summary.bad_setup += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.aborted + self.bad_setup
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total()
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} traces: {} passed, {} failed, {} aborted, {} bad setup",
            self.total(),
            self.passed,
            self.failed,
            self.aborted,
            self.bad_setup
        )
    }
}

/// Verifies `log_path`, reads `image_path` and runs the comparison.
pub fn run_trace_file(
    log_path: &Path,
    image_path: &Path,
    verifier: &TraceVerifier,
    comparator: &Comparator,
) -> TraceOutcome {
    let trace = match verifier.load(log_path) {
        Ok(trace) => trace,
        Err(err) => return TraceOutcome::BadSetup(err.into()),
    };
    let image = match fs::read(image_path) {
        Ok(image) => image,
        Err(source) => {
            return TraceOutcome::BadSetup(SetupError::Image {
                path: image_path.display().to_string(),
                source,
            })
        }
    };

    match comparator.run(&trace, &image) {
        Ok(verdict) if verdict.passed() => TraceOutcome::Pass(verdict),
        Ok(verdict) => TraceOutcome::Fail(verdict),
        Err(ConformanceError::Decode(err)) => TraceOutcome::Aborted(err),
        Err(err) => TraceOutcome::BadSetup(SetupError::Conformance(err)),
    }
}

/// Runs every `*.log` in `dir` against the `*.bin` beside it.
///
/// Results are sorted by log path. Only failing to list the directory is an
/// error; every per-trace problem becomes a [`TraceOutcome`].
pub fn run_directory(
    dir: impl AsRef<Path>,
    verifier: &TraceVerifier,
    comparator: &Comparator,
) -> io::Result<Vec<(PathBuf, TraceOutcome)>> {
    let mut logs = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "log") {
            logs.push(path);
        }
    }
    logs.sort();

    let results: Vec<(PathBuf, TraceOutcome)> = logs
        .into_iter()
        .map(|log_path| {
            let image_path = log_path.with_extension("bin");
            let outcome = run_trace_file(&log_path, &image_path, verifier, comparator);
            (log_path, outcome)
        })
        .collect();

    let summary = BatchSummary::from_outcomes(results.iter().map(|(_, outcome)| outcome));
    info!("{}: {}", dir.as_ref().display(), summary);
    Ok(results)
}
