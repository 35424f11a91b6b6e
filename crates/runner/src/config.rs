//! Suite configuration
//!
//! A [`Suite`] describes one driver under test. It is built once per test
//! invocation and not modified while a run is in progress.
//!
//! The update and write flags are debugging helpers and should never be
//! committed in the enabled state; [`Suite::apply_env_overrides`] lets a
//! developer flip them from the environment instead.

use drivercheck_core::{Driver, DriverFactory, LegacyConverter, Transformer, TypeRegistry};
use drivercheck_fixtures::FixtureStore;
use drivercheck_validation::{ForbiddenTypeScan, PositionCheck, StageValidator};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on a single `Driver::parse` call
pub const DEFAULT_PARSE_TIMEOUT: Duration = Duration::from_secs(60);

/// Unexpected parse failures tolerated in one stage group before the
/// remaining fixtures are skipped
pub const DEFAULT_MAX_PARSE_ERRORS: u32 = 3;

/// Environment variable enabling `update_native`
pub const ENV_UPDATE_NATIVE: &str = "DRIVERCHECK_UPDATE_NATIVE";
/// Environment variable enabling `update_uast`
pub const ENV_UPDATE_UAST: &str = "DRIVERCHECK_UPDATE_UAST";
/// Environment variable enabling `write_preprocessed`
pub const ENV_WRITE_PREPROCESSED: &str = "DRIVERCHECK_WRITE_PREPROCESSED";
/// Environment variable enabling `write_viewer_json`
pub const ENV_WRITE_VIEWER_JSON: &str = "DRIVERCHECK_WRITE_VIEWER_JSON";
/// Environment variable enabling `debug`
pub const ENV_DEBUG: &str = "DRIVERCHECK_DEBUG";

/// Configuration for one driver under test
#[derive(Clone)]
pub struct Suite {
    /// Language identifier
    pub lang: String,
    /// Input file extension, with the leading dot
    pub ext: String,
    /// Fixture directory
    pub path: PathBuf,

    /// Overwrite native goldens that differ from the driver output
    pub update_native: bool,
    /// Overwrite annotated and semantic goldens that differ
    pub update_uast: bool,
    /// Write a viewer document next to each matching tree golden
    pub write_viewer_json: bool,
    /// Write the preprocessed tree of every fixture
    pub write_preprocessed: bool,
    /// Log produced renderings and every fixture outcome
    pub debug: bool,

    /// Fixture to use for the transform benchmark (logical name)
    pub bench_name: Option<String>,
    /// Native type names that must not survive into semantic trees
    pub forbidden_types: Vec<String>,

    /// Upper bound on a single parse
    pub parse_timeout: Duration,
    /// Error budget ceiling per stage group
    pub max_parse_errors: u32,

    new_driver: Option<DriverFactory>,
    transformer: Option<Arc<dyn Transformer>>,
    legacy: Option<Arc<dyn LegacyConverter>>,
    registry: Arc<TypeRegistry>,
    position_checks: Vec<Arc<dyn PositionCheck>>,
}

impl fmt::Debug for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suite")
            .field("lang", &self.lang)
            .field("ext", &self.ext)
            .field("path", &self.path)
            .field("update_native", &self.update_native)
            .field("update_uast", &self.update_uast)
            .field("write_viewer_json", &self.write_viewer_json)
            .field("write_preprocessed", &self.write_preprocessed)
            .field("debug", &self.debug)
            .field("bench_name", &self.bench_name)
            .field("forbidden_types", &self.forbidden_types)
            .field("parse_timeout", &self.parse_timeout)
            .field("max_parse_errors", &self.max_parse_errors)
            .field("has_driver", &self.new_driver.is_some())
            .field("has_transformer", &self.transformer.is_some())
            .field("has_legacy", &self.legacy.is_some())
            .field("registry", &self.registry)
            .field("position_checks", &self.position_checks)
            .finish()
    }
}

impl Suite {
    /// Create a suite for `lang` with inputs ending in `ext` under `path`
    pub fn new(lang: impl Into<String>, ext: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Suite {
            lang: lang.into(),
            ext: ext.into(),
            path: path.into(),
            update_native: false,
            update_uast: false,
            write_viewer_json: false,
            write_preprocessed: false,
            debug: false,
            bench_name: None,
            forbidden_types: Vec::new(),
            parse_timeout: DEFAULT_PARSE_TIMEOUT,
            max_parse_errors: DEFAULT_MAX_PARSE_ERRORS,
            new_driver: None,
            transformer: None,
            legacy: None,
            registry: Arc::new(TypeRegistry::uast()),
            position_checks: Vec::new(),
        }
    }

    /// Set the driver constructor
    pub fn with_driver<F, D>(mut self, new_driver: F) -> Self
    where
        F: Fn() -> D + Send + Sync + 'static,
        D: Driver + 'static,
    {
        self.new_driver = Some(Arc::new(move || Box::new(new_driver()) as Box<dyn Driver>));
        self
    }

    /// Set the driver constructor from an existing factory
    pub fn with_driver_factory(mut self, factory: DriverFactory) -> Self {
        self.new_driver = Some(factory);
        self
    }

    /// Set the transformation pipeline
    pub fn with_transformer(mut self, transformer: impl Transformer + 'static) -> Self {
        self.transformer = Some(Arc::new(transformer));
        self
    }

    /// Set the legacy converter used by the `transform-legacy` benchmark
    pub fn with_legacy_converter(mut self, legacy: impl LegacyConverter + 'static) -> Self {
        self.legacy = Some(Arc::new(legacy));
        self
    }

    /// Replace the semantic type registry (defaults to the built-in UAST types)
    pub fn with_type_registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Set the forbidden native type names
    pub fn with_forbidden_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.forbidden_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Add a position-verification check for the annotated stage
    pub fn with_position_check(mut self, check: impl PositionCheck + 'static) -> Self {
        self.position_checks.push(Arc::new(check));
        self
    }

    /// Set the transform benchmark fixture
    pub fn with_bench_name(mut self, name: impl Into<String>) -> Self {
        self.bench_name = Some(name.into());
        self
    }

    /// Set the parse timeout
    pub fn with_parse_timeout(mut self, timeout: Duration) -> Self {
        self.parse_timeout = timeout;
        self
    }

    /// Set the error budget ceiling
    pub fn with_max_parse_errors(mut self, max: u32) -> Self {
        self.max_parse_errors = max;
        self
    }

    /// Set `update_native`
    pub fn update_native(mut self, enabled: bool) -> Self {
        self.update_native = enabled;
        self
    }

    /// Set `update_uast`
    pub fn update_uast(mut self, enabled: bool) -> Self {
        self.update_uast = enabled;
        self
    }

    /// Set `write_preprocessed`
    pub fn write_preprocessed(mut self, enabled: bool) -> Self {
        self.write_preprocessed = enabled;
        self
    }

    /// Set `write_viewer_json`
    pub fn write_viewer_json(mut self, enabled: bool) -> Self {
        self.write_viewer_json = enabled;
        self
    }

    /// Set `debug`
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Turn flags on from `DRIVERCHECK_*` environment variables.
    ///
    /// A variable set to `1`, `true` or `yes` enables its flag; anything else
    /// leaves the flag as configured.
    pub fn apply_env_overrides(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let enabled = |key: &str| {
            lookup(key)
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false)
        };
        self.update_native |= enabled(ENV_UPDATE_NATIVE);
        self.update_uast |= enabled(ENV_UPDATE_UAST);
        self.write_preprocessed |= enabled(ENV_WRITE_PREPROCESSED);
        self.write_viewer_json |= enabled(ENV_WRITE_VIEWER_JSON);
        self.debug |= enabled(ENV_DEBUG);
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lang.is_empty() {
            return Err(ConfigError::EmptyLanguage);
        }
        if !self.ext.starts_with('.') || self.ext.len() < 2 {
            return Err(ConfigError::InvalidExtension(self.ext.clone()));
        }
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath);
        }
        if self.parse_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.max_parse_errors == 0 {
            return Err(ConfigError::ZeroErrorBudget);
        }
        if self.new_driver.is_none() {
            return Err(ConfigError::MissingDriver);
        }
        if self.transformer.is_none() {
            return Err(ConfigError::MissingTransformer);
        }
        Ok(())
    }

    /// Fixture store over `path`
    pub fn store(&self) -> FixtureStore {
        FixtureStore::new(&self.path)
    }

    /// Driver constructor, if configured
    pub fn driver_factory(&self) -> Option<&DriverFactory> {
        self.new_driver.as_ref()
    }

    /// Transformation pipeline, if configured
    pub fn transformer(&self) -> Option<&Arc<dyn Transformer>> {
        self.transformer.as_ref()
    }

    /// Legacy converter, if configured
    pub fn legacy_converter(&self) -> Option<&Arc<dyn LegacyConverter>> {
        self.legacy.as_ref()
    }

    /// Semantic type registry
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Stage checks derived from this configuration
    pub fn validator(&self) -> StageValidator {
        let namespace = self.transformer.as_ref().and_then(|t| t.namespace());
        StageValidator::new()
            .with_forbidden(
                ForbiddenTypeScan::new(self.forbidden_types.iter().cloned())
                    .with_namespace(namespace),
            )
            .with_registry(Arc::clone(&self.registry))
            .with_position_checks(self.position_checks.clone())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Language identifier is empty
    #[error("language identifier is empty")]
    EmptyLanguage,

    /// Extension is missing its leading dot or is only a dot
    #[error("invalid extension {0:?}: expected a leading dot, like \".go\"")]
    InvalidExtension(String),

    /// Fixture path is empty
    #[error("fixture path is empty")]
    EmptyPath,

    /// Parse timeout is zero
    #[error("parse timeout must be greater than zero")]
    ZeroTimeout,

    /// Error budget ceiling is zero
    #[error("error budget ceiling must be greater than zero")]
    ZeroErrorBudget,

    /// No driver constructor configured
    #[error("no driver configured")]
    MissingDriver,

    /// No transformation pipeline configured
    #[error("no transformer configured")]
    MissingTransformer,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedDriver, ScriptedTransformer};
    use drivercheck_validation::TokenSpanCheck;
    use std::collections::HashMap;

    fn complete() -> Suite {
        Suite::new("go", ".go", "fixtures")
            .with_driver(ScriptedDriver::json)
            .with_transformer(ScriptedTransformer::new())
    }

    #[test]
    fn test_defaults() {
        let suite = Suite::new("go", ".go", "fixtures");
        assert_eq!(suite.parse_timeout, Duration::from_secs(60));
        assert_eq!(suite.max_parse_errors, 3);
        assert!(!suite.update_native);
        assert!(!suite.update_uast);
        assert!(!suite.write_preprocessed);
        assert!(!suite.write_viewer_json);
        assert!(suite.bench_name.is_none());
        assert!(suite.registry().is_registered("uast:Identifier"));
    }

    #[test]
    fn test_builder_pattern() {
        let suite = complete()
            .with_forbidden_types(["CallExpr", "FuncLit"])
            .with_position_check(TokenSpanCheck::new())
            .with_bench_name("big")
            .with_parse_timeout(Duration::from_secs(5))
            .with_max_parse_errors(1)
            .update_native(true)
            .debug(true);

        assert_eq!(suite.forbidden_types, vec!["CallExpr", "FuncLit"]);
        assert_eq!(suite.bench_name.as_deref(), Some("big"));
        assert_eq!(suite.parse_timeout, Duration::from_secs(5));
        assert_eq!(suite.max_parse_errors, 1);
        assert!(suite.update_native);
        assert!(suite.debug);
        assert!(suite.validate().is_ok());
    }

    #[test]
    fn test_validate_errors() {
        assert_eq!(
            Suite::new("", ".go", "f").validate(),
            Err(ConfigError::EmptyLanguage)
        );
        assert_eq!(
            complete().with_parse_timeout(Duration::ZERO).validate(),
            Err(ConfigError::ZeroTimeout)
        );
        assert_eq!(
            complete().with_max_parse_errors(0).validate(),
            Err(ConfigError::ZeroErrorBudget)
        );
        assert_eq!(
            Suite::new("go", ".go", "f").validate(),
            Err(ConfigError::MissingDriver)
        );
        assert_eq!(
            Suite::new("go", ".go", "f")
                .with_driver(ScriptedDriver::json)
                .validate(),
            Err(ConfigError::MissingTransformer)
        );
        assert_eq!(
            Suite::new("go", ".go", "").validate(),
            Err(ConfigError::EmptyPath)
        );
    }

    #[test]
    fn test_validate_extension() {
        let mut suite = complete();
        suite.ext = "go".into();
        assert_eq!(
            suite.validate(),
            Err(ConfigError::InvalidExtension("go".into()))
        );
        suite.ext = ".".into();
        assert!(matches!(
            suite.validate(),
            Err(ConfigError::InvalidExtension(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_UPDATE_NATIVE, "1"),
            (ENV_UPDATE_UAST, "TRUE"),
            (ENV_WRITE_VIEWER_JSON, "no"),
            (ENV_DEBUG, "yes"),
        ]
        .into_iter()
        .collect();
        let suite = complete().apply_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert!(suite.update_native);
        assert!(suite.update_uast);
        assert!(!suite.write_viewer_json);
        assert!(!suite.write_preprocessed);
        assert!(suite.debug);
    }

    #[test]
    fn test_overrides_never_disable() {
        let suite = complete()
            .update_native(true)
            .apply_overrides(|_| Some("0".to_string()));
        assert!(suite.update_native);
    }

    #[test]
    fn test_validator_uses_transformer_namespace() {
        use drivercheck_core::Node;
        use drivercheck_fixtures::Stage;

        let suite = Suite::new("go", ".go", "f")
            .with_driver(ScriptedDriver::json)
            .with_transformer(ScriptedTransformer::new().with_namespace("go"))
            .with_forbidden_types(["CallExpr"]);
        let tree = Node::typed("go:CallExpr", Vec::<(&str, Node)>::new());
        let violations = suite.validator().validate(Stage::Semantic, "", &tree);
        assert_eq!(violations.len(), 1);
    }
}
