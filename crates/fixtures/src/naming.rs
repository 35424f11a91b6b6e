//! Fixture naming convention
//!
//! Given a suite extension `.X`, the fixture directory holds:
//!
//! ```text
//! <name>.X                 input source
//! <name>.X.native          native golden
//! <name>.X.uast            annotated golden
//! <name>.X.sem.uast        semantic golden
//! <name>.X.pre.uast        preprocessed dump (optional, never compared)
//! <golden-name>_got        pending-diff artifact
//! <golden-name>.json       viewer document (optional)
//! ```
//!
//! A filename containing `_syntax_error` marks an input that must fail to
//! parse; a filename starting with `bench_` marks a benchmark input.

use drivercheck_core::Mode;
use std::fmt;

/// Suffix appended to a golden name for the pending-diff artifact
pub const GOT_SUFFIX: &str = "_got";
/// Native golden suffix
pub const NATIVE_EXT: &str = ".native";
/// Preprocessed dump suffix
pub const PREPROCESSED_EXT: &str = ".pre.uast";
/// Annotated golden suffix
pub const UAST_EXT: &str = ".uast";
/// Semantic golden suffix
pub const SEMANTIC_EXT: &str = ".sem.uast";
/// Viewer document suffix, appended to a golden name
pub const VIEWER_EXT: &str = ".json";
/// Marker substring of syntax-error fixtures
pub const SYNTAX_ERROR_MARKER: &str = "_syntax_error";
/// Prefix of benchmark fixtures
pub const BENCH_PREFIX: &str = "bench_";

/// Stage group a golden artifact belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Raw driver output
    Native,
    /// Annotated tree
    Annotated,
    /// Semantic tree
    Semantic,
}

impl Stage {
    /// All stages in execution order
    pub fn all() -> [Stage; 3] {
        [Stage::Native, Stage::Annotated, Stage::Semantic]
    }

    /// Golden artifact suffix for this stage
    pub fn golden_suffix(&self) -> &'static str {
        match self {
            Stage::Native => NATIVE_EXT,
            Stage::Annotated => UAST_EXT,
            Stage::Semantic => SEMANTIC_EXT,
        }
    }

    /// Transformation mode the stage's tree is produced in
    pub fn mode(&self) -> Mode {
        match self {
            Stage::Native => Mode::Native,
            Stage::Annotated => Mode::Annotated,
            Stage::Semantic => Mode::Semantic,
        }
    }

    /// Name of the stage group in reports
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Native => "native",
            Stage::Annotated => "uast",
            Stage::Semantic => "semantic",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Class of a fixture, derived from its filename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixtureKind {
    /// Must parse and match its goldens
    Normal,
    /// Must fail to parse with an input error
    SyntaxError,
    /// Parsed and checked like a normal fixture, also used by benchmarks
    Benchmark,
}

/// A discovered fixture input
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fixture {
    name: String,
    file_name: String,
    kind: FixtureKind,
}

impl Fixture {
    /// Recognize `file_name` as a fixture input for extension `ext`.
    ///
    /// Returns `None` unless the filename ends with `ext` and has a
    /// non-empty logical name in front of it.
    pub fn parse(file_name: &str, ext: &str) -> Option<Fixture> {
        let name = file_name.strip_suffix(ext)?;
        if name.is_empty() {
            return None;
        }
        let kind = if file_name.contains(SYNTAX_ERROR_MARKER) {
            FixtureKind::SyntaxError
        } else if file_name.starts_with(BENCH_PREFIX) {
            FixtureKind::Benchmark
        } else {
            FixtureKind::Normal
        };
        Some(Fixture {
            name: name.to_string(),
            file_name: file_name.to_string(),
            kind,
        })
    }

    /// Logical name: the filename with the extension stripped
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Input filename
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Fixture class
    pub fn kind(&self) -> FixtureKind {
        self.kind
    }

    /// Whether the input must fail to parse
    pub fn is_syntax_error(&self) -> bool {
        self.kind == FixtureKind::SyntaxError
    }

    /// Benchmark name (logical name without the `bench_` prefix), for
    /// benchmark fixtures only
    pub fn bench_name(&self) -> Option<&str> {
        match self.kind {
            FixtureKind::Benchmark => self.name.strip_prefix(BENCH_PREFIX),
            _ => None,
        }
    }

    /// Golden artifact name for `stage`
    pub fn golden_name(&self, stage: Stage) -> String {
        format!("{}{}", self.file_name, stage.golden_suffix())
    }

    /// Pending-diff artifact name for `stage`
    pub fn pending_name(&self, stage: Stage) -> String {
        pending_name(&self.golden_name(stage))
    }

    /// Preprocessed dump name
    pub fn preprocessed_name(&self) -> String {
        format!("{}{}", self.file_name, PREPROCESSED_EXT)
    }

    /// Viewer document name for `stage`
    pub fn viewer_name(&self, stage: Stage) -> String {
        format!("{}{}", self.golden_name(stage), VIEWER_EXT)
    }
}

impl fmt::Display for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Pending-diff artifact name for a golden artifact name
pub fn pending_name(golden_name: &str) -> String {
    format!("{}{}", golden_name, GOT_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normal_fixture() {
        let f = Fixture::parse("hello.go", ".go").unwrap();
        assert_eq!(f.name(), "hello");
        assert_eq!(f.file_name(), "hello.go");
        assert_eq!(f.kind(), FixtureKind::Normal);
        assert!(!f.is_syntax_error());
    }

    #[test]
    fn test_parse_rejects_other_files() {
        assert!(Fixture::parse("hello.go.native", ".go").is_none());
        assert!(Fixture::parse("hello.go.sem.uast", ".go").is_none());
        assert!(Fixture::parse("README.md", ".go").is_none());
        assert!(Fixture::parse(".go", ".go").is_none());
    }

    #[test]
    fn test_syntax_error_marker() {
        let f = Fixture::parse("unclosed_syntax_error.go", ".go").unwrap();
        assert_eq!(f.kind(), FixtureKind::SyntaxError);
        assert!(f.is_syntax_error());
    }

    #[test]
    fn test_syntax_error_takes_precedence_over_bench() {
        let f = Fixture::parse("bench_big_syntax_error.go", ".go").unwrap();
        assert_eq!(f.kind(), FixtureKind::SyntaxError);
        assert_eq!(f.bench_name(), None);
    }

    #[test]
    fn test_bench_fixture() {
        let f = Fixture::parse("bench_loops.py", ".py").unwrap();
        assert_eq!(f.kind(), FixtureKind::Benchmark);
        assert_eq!(f.name(), "bench_loops");
        assert_eq!(f.bench_name(), Some("loops"));
        assert_eq!(Fixture::parse("loops.py", ".py").unwrap().bench_name(), None);
    }

    #[test]
    fn test_artifact_names() {
        let f = Fixture::parse("a.py", ".py").unwrap();
        assert_eq!(f.golden_name(Stage::Native), "a.py.native");
        assert_eq!(f.golden_name(Stage::Annotated), "a.py.uast");
        assert_eq!(f.golden_name(Stage::Semantic), "a.py.sem.uast");
        assert_eq!(f.preprocessed_name(), "a.py.pre.uast");
        assert_eq!(f.pending_name(Stage::Native), "a.py.native_got");
        assert_eq!(f.pending_name(Stage::Semantic), "a.py.sem.uast_got");
        assert_eq!(f.viewer_name(Stage::Annotated), "a.py.uast.json");
    }

    #[test]
    fn test_stage_modes_and_names() {
        assert_eq!(Stage::Native.mode(), Mode::Native);
        assert_eq!(Stage::Annotated.mode(), Mode::Annotated);
        assert_eq!(Stage::Semantic.mode(), Mode::Semantic);
        assert_eq!(Stage::Annotated.to_string(), "uast");
        assert_eq!(Stage::all()[0], Stage::Native);
    }
}
