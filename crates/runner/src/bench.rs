//! Benchmark runner
//!
//! Three measurements, named after the groups they report under:
//!
//! - `transform`: parse the configured benchmark fixture once, then time
//!   only the semantic transform. Each iteration transforms a fresh clone of
//!   the parsed tree.
//! - `transform-legacy`: same, followed by conversion into the legacy tree
//!   format, so the cost of the legacy path can be compared.
//! - `fixtures/<name>`: for every `bench_<name>` fixture, time parse plus
//!   semantic transform from source text.
//!
//! Timings come from [`Instant`]. Allocation counts are reported when a
//! [`CountingAllocator`] is installed as the global allocator and handed to
//! the runner with [`BenchmarkRunner::with_allocator`].
//!
//! [`TransformBench`] and [`FixtureBench`] expose a single iteration so that
//! external harnesses (criterion) can drive the same work.

use crate::config::{ConfigError, Suite};
use crate::error::{RunnerError, RunnerResult};
use crate::session::DriverSession;
use drivercheck_core::{LegacyConverter, Mode, Node, Transformer};
use std::alloc::{GlobalAlloc, Layout, System};
use std::hint::black_box;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default number of timed iterations
pub const DEFAULT_ITERATIONS: u64 = 100;

/// Global allocator wrapper counting allocations
///
/// ```ignore
/// #[global_allocator]
/// static ALLOC: CountingAllocator = CountingAllocator::new();
/// ```
#[derive(Debug)]
pub struct CountingAllocator {
    allocations: AtomicU64,
    bytes: AtomicU64,
}

impl CountingAllocator {
    /// Create an allocator with zeroed counters
    pub const fn new() -> Self {
        Self {
            allocations: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
        }
    }

    /// Allocations since creation (reallocations included)
    pub fn allocations(&self) -> u64 {
        self.allocations.load(Ordering::Relaxed)
    }

    /// Bytes requested since creation
    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    fn count(&self, size: usize) {
        // Relaxed: plain statistics, read only after the measured loop
        self.allocations.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(size as u64, Ordering::Relaxed);
    }
}

impl Default for CountingAllocator {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        self.count(layout.size());
        System.alloc(layout)
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        self.count(layout.size());
        System.alloc_zeroed(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        self.count(new_size);
        System.realloc(ptr, layout, new_size)
    }
}

/// Result of one benchmark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchReport {
    /// Benchmark name
    pub name: String,
    /// Timed iterations
    pub iterations: u64,
    /// Total time over all iterations
    pub total: Duration,
    /// Allocations over all iterations, when counted
    pub allocations: Option<u64>,
    /// Reason the benchmark did not run
    pub skipped: Option<String>,
}

impl BenchReport {
    fn skipped(name: &str, reason: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            iterations: 0,
            total: Duration::ZERO,
            allocations: None,
            skipped: Some(reason.into()),
        }
    }

    /// Whether the benchmark was skipped
    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }

    /// Mean time per iteration
    pub fn per_iteration(&self) -> Duration {
        match u32::try_from(self.iterations) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.total / n,
            Err(_) => Duration::from_secs_f64(self.total.as_secs_f64() / self.iterations as f64),
        }
    }

    /// Mean allocations per iteration, when counted
    pub fn allocations_per_iteration(&self) -> Option<u64> {
        match self.iterations {
            0 => None,
            n => self.allocations.map(|a| a / n),
        }
    }
}

/// One prepared transform benchmark iteration
///
/// Holds the parsed base tree. [`TransformBench::iterate`] never touches the
/// base tree itself, so iterations cannot observe each other.
pub struct TransformBench {
    code: String,
    base: Node,
    transformer: Arc<dyn Transformer>,
    legacy: Option<Arc<dyn LegacyConverter>>,
}

impl std::fmt::Debug for TransformBench {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformBench")
            .field("base_size", &self.base.size())
            .field("legacy", &self.legacy.is_some())
            .finish()
    }
}

impl TransformBench {
    /// Parsed tree every iteration starts from
    pub fn base(&self) -> &Node {
        &self.base
    }

    /// Transform a clone of the base tree to semantic mode, then convert it
    /// to the legacy format for the legacy variant
    pub fn iterate(&self) -> RunnerResult<Node> {
        let tree = self
            .transformer
            .transform(Mode::Semantic, &self.code, self.base.clone())?;
        match &self.legacy {
            Some(legacy) => Ok(legacy.to_legacy(&tree)?),
            None => Ok(tree),
        }
    }
}

/// One prepared fixture benchmark iteration
pub struct FixtureBench {
    name: String,
    code: String,
    session: Arc<DriverSession>,
    transformer: Arc<dyn Transformer>,
}

impl std::fmt::Debug for FixtureBench {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixtureBench")
            .field("name", &self.name)
            .field("session", &self.session)
            .finish()
    }
}

impl FixtureBench {
    /// Benchmark name (`bench_` prefix and extension stripped)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parse the source text and transform it to semantic mode.
    ///
    /// The parse is bounded by the suite parse timeout like any other.
    pub fn iterate(&self) -> RunnerResult<Node> {
        let tree = self
            .session
            .parse(&self.code)
            .map_err(RunnerError::Parse)?;
        Ok(self.transformer.transform(Mode::Semantic, &self.code, tree)?)
    }
}

/// Runs the benchmarks of a suite
#[derive(Debug)]
pub struct BenchmarkRunner<'a> {
    suite: &'a Suite,
    iterations: u64,
    allocator: Option<&'static CountingAllocator>,
}

impl<'a> BenchmarkRunner<'a> {
    /// Create a runner for `suite`
    pub fn new(suite: &'a Suite) -> Self {
        Self {
            suite,
            iterations: DEFAULT_ITERATIONS,
            allocator: None,
        }
    }

    /// Set the number of timed iterations per benchmark
    pub fn iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    /// Report allocation counts from `allocator`, which must be the
    /// installed global allocator
    pub fn with_allocator(mut self, allocator: &'static CountingAllocator) -> Self {
        self.allocator = Some(allocator);
        self
    }

    /// Run `transform`, `transform-legacy` and every fixture benchmark
    pub fn run_all(&self) -> RunnerResult<Vec<BenchReport>> {
        let mut reports = vec![self.transform(false)?, self.transform(true)?];
        reports.extend(self.fixtures()?);
        Ok(reports)
    }

    /// Prepare the transform benchmark.
    ///
    /// Returns `Ok(Err(reason))` when the benchmark does not apply: no
    /// benchmark fixture configured, or no legacy converter for the legacy
    /// variant.
    pub fn prepare_transform(&self, legacy: bool) -> RunnerResult<Result<TransformBench, String>> {
        let transformer = self.transformer()?;
        let Some(bench_name) = &self.suite.bench_name else {
            return Ok(Err("no benchmark fixture configured".to_string()));
        };
        let legacy = match (legacy, self.suite.legacy_converter()) {
            (false, _) => None,
            (true, Some(converter)) => Some(Arc::clone(converter)),
            (true, None) => return Ok(Err("no legacy converter configured".to_string())),
        };

        let code = self
            .suite
            .store()
            .read_required(&format!("{}{}", bench_name, self.suite.ext))?;
        let session = self.open_session()?;
        let base = session.parse(&code).map_err(RunnerError::Parse)?;
        // The driver is not needed for the timed part.
        if let Err(e) = session.close() {
            warn!(target: "drivercheck::bench", error = %e, "Failed to close driver");
        }

        Ok(Ok(TransformBench {
            code,
            base,
            transformer,
            legacy,
        }))
    }

    /// Time the semantic transform of the benchmark fixture, optionally
    /// followed by legacy conversion
    pub fn transform(&self, legacy: bool) -> RunnerResult<BenchReport> {
        let name = if legacy { "transform-legacy" } else { "transform" };
        match self.prepare_transform(legacy)? {
            Ok(bench) => self.measure(name, || bench.iterate()),
            Err(reason) => {
                info!(target: "drivercheck::bench", bench = name, %reason, "Benchmark skipped");
                Ok(BenchReport::skipped(name, reason))
            }
        }
    }

    /// Prepare one benchmark per `bench_` fixture, sharing a single driver
    pub fn prepare_fixtures(&self) -> RunnerResult<Vec<FixtureBench>> {
        let transformer = self.transformer()?;
        let store = self.suite.store();
        let fixtures: Vec<_> = store
            .discover(&self.suite.ext)?
            .into_iter()
            .filter(|f| f.bench_name().is_some())
            .collect();

        if fixtures.is_empty() {
            return Ok(Vec::new());
        }

        let session = Arc::new(self.open_session()?);
        let mut benches = Vec::with_capacity(fixtures.len());
        for fixture in fixtures {
            let Some(name) = fixture.bench_name() else {
                continue;
            };
            benches.push(FixtureBench {
                name: name.to_string(),
                code: store.read_required(fixture.file_name())?,
                session: Arc::clone(&session),
                transformer: Arc::clone(&transformer),
            });
        }
        Ok(benches)
    }

    /// Time parse plus semantic transform of every benchmark fixture
    pub fn fixtures(&self) -> RunnerResult<Vec<BenchReport>> {
        self.prepare_fixtures()?
            .iter()
            .map(|bench| self.measure(&format!("fixtures/{}", bench.name()), || bench.iterate()))
            .collect()
    }

    fn transformer(&self) -> RunnerResult<Arc<dyn Transformer>> {
        self.suite.validate()?;
        Ok(Arc::clone(
            self.suite
                .transformer()
                .ok_or(ConfigError::MissingTransformer)?,
        ))
    }

    fn open_session(&self) -> RunnerResult<DriverSession> {
        let factory = self
            .suite
            .driver_factory()
            .ok_or(ConfigError::MissingDriver)?;
        DriverSession::open(factory, self.suite.parse_timeout).map_err(RunnerError::DriverStart)
    }

    fn measure<F>(&self, name: &str, mut iteration: F) -> RunnerResult<BenchReport>
    where
        F: FnMut() -> RunnerResult<Node>,
    {
        let allocations_before = self.allocator.map(CountingAllocator::allocations);
        let started = Instant::now();
        for _ in 0..self.iterations {
            black_box(iteration()?);
        }
        let total = started.elapsed();
        let allocations = self
            .allocator
            .zip(allocations_before)
            .map(|(alloc, before)| alloc.allocations().saturating_sub(before));

        let report = BenchReport {
            name: name.to_string(),
            iterations: self.iterations,
            total,
            allocations,
            skipped: None,
        };
        debug!(
            target: "drivercheck::bench",
            bench = name,
            iterations = report.iterations,
            per_iteration = ?report.per_iteration(),
            allocations = ?report.allocations,
            "Benchmark finished"
        );
        Ok(report)
    }
}
