//! Sandboxed Python execution.
//!
//! [`PythonSandbox::run`] evaluates one untrusted snippet and always returns a
//! [`SandboxOutcome`]; nothing escapes as an error or a panic. A run goes
//! through four gates:
//!
//! 1. a static import scan in Rust ([`imports`]), checked against the denied
//!    set and the caller's allowlist
//! 2. a restricted namespace built inside the child from [`SandboxPolicy`],
//!    where modules are attribute-filtered copies and any import the scan
//!    missed is refused again with the same reasons
//! 3. a fresh interpreter process with resource limits and its own process
//!    group
//! 4. a host-side deadline that kills the whole group on expiry
//!
//! ## Result precedence
//!
//! Timeout, then refused access, then anything on the error stream, then the
//! value of an expression, then the text of a `result` variable, then
//! captured stdout.
//!
//! ## Example
//!
//! ```rust,ignore
//! use toolstep::sandbox::{PythonSandbox, SandboxRequest};
//!
//! let sandbox = PythonSandbox::default();
//! let outcome = sandbox.run(&SandboxRequest::new("1 + 1")).await;
//! assert_eq!(outcome.to_string(), "2");
//! ```

pub mod imports;
mod policy;
mod runner;

pub use policy::{
    SandboxPolicy, APPROVED, BASELINE_DENIED, PRELOADED, RESTRICTED_ATTRIBUTES, SAFE_BUILTINS,
};

use crate::sandbox::imports::scan_imports;
use crate::sandbox::runner::{
    describe_crash, run_child, truncate_output, ChildExit, ChildLimits, CompileMode, Envelope,
    ErrorKind, RunnerRequest,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::time::{Duration, Instant};

/// Marker that starts every failed result.
pub const ERROR_MARKER: &str = "Error: ";

/// Default per-run timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Ceiling on any configured or requested timeout.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(3600);

/// Host-side settings for the sandbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Interpreter executable
    pub interpreter: String,
    /// Timeout used when a caller does not give one
    pub default_timeout_secs: f64,
    /// Upper bound on caller-supplied timeouts
    pub max_timeout_secs: f64,
    /// Address space limit for the child, 0 for none
    pub memory_limit_mb: u64,
    /// Results longer than this are truncated
    pub max_output_bytes: usize,
    /// Modules denied on top of the baseline for every run
    pub extra_denied_imports: Vec<String>,
    /// Import and namespace policy, the `[sandbox.policy]` table
    pub policy: SandboxPolicy,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            default_timeout_secs: DEFAULT_TIMEOUT.as_secs_f64(),
            max_timeout_secs: 30.0,
            memory_limit_mb: 512,
            max_output_bytes: 64 * 1024,
            extra_denied_imports: Vec::new(),
            policy: SandboxPolicy::default(),
        }
    }
}

impl SandboxConfig {
    /// Resolves a caller-supplied timeout in seconds against the configured
    /// default and maximum, never above [`MAX_TIMEOUT`].
    #[must_use]
    pub fn clamp_timeout(&self, requested_secs: Option<f64>) -> Duration {
        let secs = requested_secs
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(self.default_timeout_secs)
            .min(self.max_timeout_secs)
            .min(MAX_TIMEOUT.as_secs_f64())
            .max(0.1);
        Duration::try_from_secs_f64(secs).unwrap_or(DEFAULT_TIMEOUT)
    }
}

/// One snippet to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxRequest {
    /// Source code
    pub code: String,
    /// Modules the snippet may import; `None` forbids all imports
    pub allowed_imports: Option<BTreeSet<String>>,
    /// Modules denied in addition to the baseline
    pub denied_imports: BTreeSet<String>,
    /// Wall-clock limit
    pub timeout: Duration,
}

impl SandboxRequest {
    /// Creates a request with no imports allowed and the default timeout.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            allowed_imports: None,
            denied_imports: BTreeSet::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the import allowlist.
    #[must_use]
    pub fn with_allowed_imports<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_imports = Some(modules.into_iter().map(Into::into).collect());
        self
    }

    /// Adds modules to the denied set.
    #[must_use]
    pub fn with_denied_imports<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.denied_imports.extend(modules.into_iter().map(Into::into));
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Why an import was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// The module is in the denied set
    Denied,
    /// The request carried no allowlist
    NoAllowlist,
    /// The allowlist does not name the module
    NotAllowlisted,
    /// A package-relative import
    Relative,
    /// Allowlisted, but not a module the sandbox can provide
    Unavailable,
}

/// A failed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxFailure {
    kind: SandboxFailureKind,
}

/// Specific sandbox failure categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SandboxFailureKind {
    /// An import was refused before execution
    Denied {
        /// The module as written
        module: String,
        /// Why it was refused
        reason: DenialReason,
    },
    /// The snippet touches a dunder name or a frame attribute
    Restricted {
        /// The first such name in source order
        name: String,
    },
    /// The snippet does not compile
    Syntax {
        /// Interpreter message
        message: String,
    },
    /// The snippet raised or wrote to its error stream
    Runtime {
        /// Interpreter message
        message: String,
    },
    /// The deadline passed
    Timeout {
        /// The deadline that was exceeded
        after: Duration,
    },
    /// The interpreter could not be started or talked to
    Spawn {
        /// What went wrong
        message: String,
    },
}

impl SandboxFailure {
    /// Creates a new failure with the given kind.
    #[must_use]
    pub fn new(kind: SandboxFailureKind) -> Self {
        Self { kind }
    }

    /// Returns the failure category.
    #[must_use]
    pub fn kind(&self) -> &SandboxFailureKind {
        &self.kind
    }

    /// Creates an import denial.
    #[must_use]
    pub fn denied(module: impl Into<String>, reason: DenialReason) -> Self {
        Self::new(SandboxFailureKind::Denied {
            module: module.into(),
            reason,
        })
    }

    /// Creates a refused attribute or name access.
    #[must_use]
    pub fn restricted(name: impl Into<String>) -> Self {
        Self::new(SandboxFailureKind::Restricted { name: name.into() })
    }

    /// Creates a timeout failure.
    #[must_use]
    pub fn timeout(after: Duration) -> Self {
        Self::new(SandboxFailureKind::Timeout { after })
    }

    /// Returns true for refused imports.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self.kind, SandboxFailureKind::Denied { .. })
    }

    /// Returns true for refused attribute or name access.
    #[must_use]
    pub fn is_restricted(&self) -> bool {
        matches!(self.kind, SandboxFailureKind::Restricted { .. })
    }

    /// Returns true when the deadline passed.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, SandboxFailureKind::Timeout { .. })
    }
}

impl fmt::Display for SandboxFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ERROR_MARKER)?;
        match &self.kind {
            SandboxFailureKind::Denied { module, reason } => match reason {
                DenialReason::Denied => write!(f, "import of '{}' is not permitted", module),
                DenialReason::NoAllowlist => write!(
                    f,
                    "import of '{}' is not permitted; list it in allowed_imports",
                    module
                ),
                DenialReason::NotAllowlisted => {
                    write!(f, "import of '{}' is not in allowed_imports", module)
                }
                DenialReason::Relative => write!(f, "relative imports are not permitted"),
                DenialReason::Unavailable => {
                    write!(f, "module '{}' is not available in the sandbox", module)
                }
            },
            SandboxFailureKind::Restricted { name } => {
                write!(f, "access to '{}' is not permitted", name)
            }
            SandboxFailureKind::Syntax { message } | SandboxFailureKind::Runtime { message } => {
                f.write_str(message)
            }
            SandboxFailureKind::Timeout { after } => {
                write!(f, "execution timed out after {}s", after.as_secs_f64())
            }
            SandboxFailureKind::Spawn { message } => write!(f, "sandbox unavailable: {}", message),
        }
    }
}

impl std::error::Error for SandboxFailure {}

/// The single result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SandboxOutcome {
    /// The snippet's output text
    Success(String),
    /// Why the run failed
    Failure(SandboxFailure),
}

impl SandboxOutcome {
    /// Returns true if the run succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the failure, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&SandboxFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }
}

impl fmt::Display for SandboxOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(text) => f.write_str(text),
            Self::Failure(failure) => fmt::Display::fmt(failure, f),
        }
    }
}

impl From<SandboxFailure> for SandboxOutcome {
    fn from(failure: SandboxFailure) -> Self {
        Self::Failure(failure)
    }
}

/// Runs snippets in isolated child interpreters.
#[derive(Debug, Clone, Default)]
pub struct PythonSandbox {
    config: SandboxConfig,
}

impl PythonSandbox {
    /// Creates a sandbox with the given settings and the policy they carry.
    #[must_use]
    pub fn new(config: SandboxConfig) -> Self {
        Self { config }
    }

    /// Replaces the import and namespace policy.
    #[must_use]
    pub fn with_policy(mut self, policy: SandboxPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Returns the import and namespace policy.
    #[must_use]
    pub fn policy(&self) -> &SandboxPolicy {
        &self.config.policy
    }

    fn denied_for(&self, request: &SandboxRequest) -> BTreeSet<String> {
        let mut extra = request.denied_imports.clone();
        extra.extend(self.config.extra_denied_imports.iter().cloned());
        self.config.policy.denied_with(&extra)
    }

    /// Returns the host settings.
    #[must_use]
    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Checks imports and the allowlist without running anything.
    ///
    /// Returns the modules to materialize in the namespace.
    ///
    /// # Errors
    ///
    /// Returns the first refused import.
    pub fn check_imports(&self, request: &SandboxRequest) -> Result<Vec<String>, SandboxFailure> {
        let denied = self.denied_for(request);

        match scan_imports(&request.code) {
            Ok(found) => {
                for import in found {
                    if import.is_relative() {
                        return Err(SandboxFailure::denied(import.module, DenialReason::Relative));
                    }
                    let top = import.top_level();
                    if denied.contains(top) || denied.contains(&import.module) {
                        return Err(SandboxFailure::denied(import.module, DenialReason::Denied));
                    }
                    match &request.allowed_imports {
                        None => {
                            return Err(SandboxFailure::denied(
                                import.module,
                                DenialReason::NoAllowlist,
                            ))
                        }
                        Some(allowed) if !allowed.contains(top) => {
                            return Err(SandboxFailure::denied(
                                import.module,
                                DenialReason::NotAllowlisted,
                            ))
                        }
                        Some(_) => {}
                    }
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "Import scan skipped; leaving the error to the interpreter");
            }
        }

        let mut materialize = Vec::new();
        for module in request.allowed_imports.iter().flatten() {
            if denied.contains(module) {
                return Err(SandboxFailure::denied(module.clone(), DenialReason::Denied));
            }
            if !self.config.policy.is_materializable(module) {
                return Err(SandboxFailure::denied(module.clone(), DenialReason::Unavailable));
            }
            if !self.config.policy.preloaded.contains(module) {
                materialize.push(module.clone());
            }
        }
        Ok(materialize)
    }

    /// Runs one snippet.
    pub async fn run(&self, request: &SandboxRequest) -> SandboxOutcome {
        let started = Instant::now();
        let outcome = self.run_inner(request).await;
        let outcome = match outcome {
            SandboxOutcome::Success(text) => {
                SandboxOutcome::Success(truncate_output(text, self.config.max_output_bytes))
            }
            failure => failure,
        };

        match outcome.failure() {
            None => tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "Sandbox run succeeded"),
            Some(failure) => tracing::debug!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                failure = %failure,
                "Sandbox run failed"
            ),
        }
        outcome
    }

    async fn run_inner(&self, request: &SandboxRequest) -> SandboxOutcome {
        match self.check_imports(request) {
            Ok(materialize) => self.execute(request, &materialize).await,
            Err(failure) => failure.into(),
        }
    }

    /// Runs the snippet in a child, which applies its own import checks.
    async fn execute(&self, request: &SandboxRequest, materialize: &[String]) -> SandboxOutcome {
        let policy = &self.config.policy;
        let denied = self.denied_for(request);
        let runner_request = RunnerRequest {
            code: &request.code,
            preload: policy.preloaded.iter().map(String::as_str).collect(),
            modules: materialize.iter().map(String::as_str).collect(),
            builtins: policy.builtins.iter().map(String::as_str).collect(),
            denied: denied.iter().map(String::as_str).collect(),
            allowed: request
                .allowed_imports
                .as_ref()
                .map(|allowed| allowed.iter().map(String::as_str).collect()),
            restricted: RESTRICTED_ATTRIBUTES.to_vec(),
        };
        let limits = ChildLimits {
            timeout: request.timeout,
            memory_limit_mb: self.config.memory_limit_mb,
        };

        let exit = match run_child(&self.config.interpreter, &runner_request, limits).await {
            Ok(exit) => exit,
            Err(e) => {
                tracing::warn!(error = %e.0, "Sandbox interpreter unavailable");
                return SandboxFailure::new(SandboxFailureKind::Spawn { message: e.0 }).into();
            }
        };

        match exit {
            ChildExit::TimedOut => SandboxFailure::timeout(request.timeout).into(),
            ChildExit::Crashed { status, stderr } => {
                SandboxFailure::new(SandboxFailureKind::Runtime {
                    message: describe_crash(status, &stderr),
                })
                .into()
            }
            ChildExit::Finished(envelope) => self.settle(envelope),
        }
    }

    fn settle(&self, envelope: Envelope) -> SandboxOutcome {
        if let Some(name) = envelope.restricted {
            return SandboxFailure::restricted(name).into();
        }
        if let Some(refusal) = envelope.denied {
            return SandboxFailure::denied(refusal.module, refusal.reason).into();
        }
        if !envelope.stderr.trim().is_empty() {
            let message =
                truncate_output(envelope.stderr.trim_end().to_string(), self.config.max_output_bytes);
            let kind = match envelope.error_kind {
                Some(ErrorKind::Syntax) => SandboxFailureKind::Syntax { message },
                _ => SandboxFailureKind::Runtime { message },
            };
            return SandboxFailure::new(kind).into();
        }
        match (envelope.mode, envelope.value, envelope.result) {
            (CompileMode::Eval, Some(value), _) => SandboxOutcome::Success(value),
            (_, _, Some(result)) => SandboxOutcome::Success(result),
            _ => SandboxOutcome::Success(envelope.stdout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python_available() -> bool {
        std::process::Command::new("python3")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    macro_rules! require_python {
        () => {
            if !python_available() {
                assert!(
                    std::env::var_os("TOOLSTEP_SKIP_PYTHON_TESTS").is_some(),
                    "python3 not found; install it or set TOOLSTEP_SKIP_PYTHON_TESTS=1"
                );
                eprintln!("python3 not found; skipping");
                return;
            }
        };
    }

    #[test]
    fn denied_import_fails_identically_with_or_without_allowlist() {
        let sandbox = PythonSandbox::default();
        let bare = SandboxRequest::new("import os\nos.getcwd()");
        let allowed = bare.clone().with_allowed_imports(["os"]);

        let a = sandbox.check_imports(&bare).unwrap_err();
        let b = sandbox.check_imports(&allowed).unwrap_err();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "Error: import of 'os' is not permitted");
    }

    #[test]
    fn submodule_of_denied_package_is_denied() {
        let sandbox = PythonSandbox::default();
        let err = sandbox
            .check_imports(&SandboxRequest::new("from os.path import join"))
            .unwrap_err();
        assert!(err.is_denied());
    }

    #[test]
    fn imports_need_an_allowlist() {
        let sandbox = PythonSandbox::default();
        let err = sandbox
            .check_imports(&SandboxRequest::new("import json"))
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            SandboxFailureKind::Denied { reason: DenialReason::NoAllowlist, .. }
        ));

        let err = sandbox
            .check_imports(&SandboxRequest::new("import json").with_allowed_imports(["re"]))
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            SandboxFailureKind::Denied { reason: DenialReason::NotAllowlisted, .. }
        ));
    }

    #[test]
    fn allowlisted_approved_modules_are_materialized() {
        let sandbox = PythonSandbox::default();
        let request = SandboxRequest::new("import json\njson.dumps([1])")
            .with_allowed_imports(["json", "math"]);
        assert_eq!(sandbox.check_imports(&request).unwrap(), vec!["json".to_string()]);
    }

    #[test]
    fn unknown_allowlist_entries_are_rejected() {
        let sandbox = PythonSandbox::default();
        let err = sandbox
            .check_imports(&SandboxRequest::new("1").with_allowed_imports(["numpy"]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Error: module 'numpy' is not available in the sandbox");
    }

    #[test]
    fn caller_and_config_denials_apply() {
        let sandbox = PythonSandbox::new(SandboxConfig {
            extra_denied_imports: vec!["random".to_string()],
            ..SandboxConfig::default()
        });
        let request = SandboxRequest::new("import random").with_allowed_imports(["random"]);
        assert!(sandbox.check_imports(&request).unwrap_err().is_denied());

        let request = SandboxRequest::new("import json")
            .with_allowed_imports(["json"])
            .with_denied_imports(["json"]);
        assert!(PythonSandbox::default().check_imports(&request).is_err());
    }

    #[test]
    fn relative_imports_are_denied() {
        let err = PythonSandbox::default()
            .check_imports(&SandboxRequest::new("from . import secrets").with_allowed_imports(["json"]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Error: relative imports are not permitted");
    }

    #[test]
    fn timeout_clamping() {
        let config = SandboxConfig::default();
        assert_eq!(config.clamp_timeout(None), Duration::from_secs(2));
        assert_eq!(config.clamp_timeout(Some(5.0)), Duration::from_secs(5));
        assert_eq!(config.clamp_timeout(Some(1e9)), Duration::from_secs(30));
        assert_eq!(config.clamp_timeout(Some(-1.0)), Duration::from_secs(2));
        assert_eq!(config.clamp_timeout(Some(f64::NAN)), Duration::from_secs(2));
    }

    #[test]
    fn unbounded_maximum_is_capped() {
        let config = SandboxConfig {
            max_timeout_secs: 1e20,
            ..SandboxConfig::default()
        };
        assert_eq!(config.clamp_timeout(Some(1e20)), MAX_TIMEOUT);
        assert_eq!(config.clamp_timeout(Some(f64::MAX)), MAX_TIMEOUT);

        let config = SandboxConfig {
            default_timeout_secs: f64::INFINITY,
            max_timeout_secs: f64::INFINITY,
            ..SandboxConfig::default()
        };
        assert_eq!(config.clamp_timeout(None), MAX_TIMEOUT);
    }

    #[test]
    fn policy_travels_with_the_config() {
        let mut config = SandboxConfig::default();
        config.policy.denied_imports.insert("random".to_string());
        let sandbox = PythonSandbox::new(config);
        let request = SandboxRequest::new("import random").with_allowed_imports(["random"]);
        assert!(sandbox.check_imports(&request).unwrap_err().is_denied());
        assert!(sandbox.policy().denied_imports.contains("random"));
    }

    #[test]
    fn restricted_display() {
        let failure = SandboxFailure::restricted("__globals__");
        assert_eq!(failure.to_string(), "Error: access to '__globals__' is not permitted");
        assert!(failure.is_restricted());
        assert!(!failure.is_denied());
    }

    #[test]
    fn timeout_display() {
        let failure = SandboxFailure::timeout(Duration::from_secs(1));
        assert_eq!(failure.to_string(), "Error: execution timed out after 1s");
    }

    #[tokio::test]
    async fn expression_value_is_returned() {
        require_python!();
        let outcome = PythonSandbox::default().run(&SandboxRequest::new("1 + 1")).await;
        assert_eq!(outcome.to_string(), "2");
    }

    #[tokio::test]
    async fn result_variable_beats_stdout() {
        require_python!();
        let outcome = PythonSandbox::default()
            .run(&SandboxRequest::new("result = 42\nprint(\"hi\")"))
            .await;
        assert_eq!(outcome.to_string(), "42");
    }

    #[tokio::test]
    async fn stdout_is_the_fallback() {
        require_python!();
        let outcome = PythonSandbox::default()
            .run(&SandboxRequest::new("for i in range(3):\n    print(i)"))
            .await;
        assert_eq!(outcome.to_string(), "0\n1\n2\n");
    }

    #[tokio::test]
    async fn preloaded_modules_need_no_import() {
        require_python!();
        let outcome = PythonSandbox::default()
            .run(&SandboxRequest::new("math.sqrt(16) + statistics.mean([1, 3])"))
            .await;
        assert_eq!(outcome.to_string(), "6.0");
    }

    #[tokio::test]
    async fn allowlisted_import_executes() {
        require_python!();
        let request = SandboxRequest::new("import json\nresult = json.dumps({'a': 1})")
            .with_allowed_imports(["json"]);
        let outcome = PythonSandbox::default().run(&request).await;
        assert_eq!(outcome.to_string(), r#"{"a": 1}"#);
    }

    #[tokio::test]
    async fn runtime_errors_are_marked() {
        require_python!();
        let outcome = PythonSandbox::default().run(&SandboxRequest::new("1 / 0")).await;
        assert_eq!(outcome.to_string(), "Error: ZeroDivisionError: division by zero");
    }

    #[tokio::test]
    async fn syntax_errors_are_marked() {
        require_python!();
        let outcome = PythonSandbox::default().run(&SandboxRequest::new("def (:")).await;
        let failure = outcome.failure().unwrap();
        assert!(matches!(failure.kind(), SandboxFailureKind::Syntax { .. }));
        assert!(outcome.to_string().starts_with("Error: SyntaxError"));
    }

    #[tokio::test]
    async fn restricted_builtins_are_missing() {
        require_python!();
        let outcome = PythonSandbox::default()
            .run(&SandboxRequest::new("open('/etc/passwd').read()"))
            .await;
        assert_eq!(outcome.to_string(), "Error: NameError: name 'open' is not defined");
    }

    #[tokio::test]
    async fn dynamic_import_is_restricted() {
        require_python!();
        let outcome = PythonSandbox::default()
            .run(&SandboxRequest::new("__import__('os')"))
            .await;
        assert_eq!(outcome.to_string(), "Error: access to '__import__' is not permitted");
    }

    #[tokio::test]
    async fn child_denials_read_like_static_ones() {
        require_python!();
        let sandbox = PythonSandbox::default();
        let cases = [
            SandboxRequest::new("import os\nos.getcwd()"),
            SandboxRequest::new("import os").with_allowed_imports(["os"]),
            SandboxRequest::new("import json"),
            SandboxRequest::new("from json import dumps").with_allowed_imports(["re"]),
        ];
        for request in cases {
            let expected = sandbox.check_imports(&request).unwrap_err();
            // Skip the static scan so only the child can refuse.
            let outcome = sandbox.execute(&request, &[]).await;
            assert_eq!(outcome.failure(), Some(&expected), "{}", request.code);
        }
    }

    #[tokio::test]
    async fn caught_denials_still_fail_the_run() {
        require_python!();
        let request = SandboxRequest::new("try:\n    import os\nexcept ImportError:\n    result = 'ok'");
        let outcome = PythonSandbox::default().execute(&request, &[]).await;
        assert_eq!(outcome.to_string(), "Error: import of 'os' is not permitted");
    }

    #[tokio::test]
    async fn preloaded_modules_hide_their_submodules() {
        require_python!();
        let sandbox = PythonSandbox::default();
        let outcome = sandbox
            .run(&SandboxRequest::new("statistics.sys.modules['os'].listdir('/')"))
            .await;
        assert!(
            outcome.to_string().starts_with("Error: AttributeError"),
            "{outcome}"
        );

        let outcome = sandbox.run(&SandboxRequest::new("math.__loader__")).await;
        assert_eq!(outcome.to_string(), "Error: access to '__loader__' is not permitted");
    }

    #[tokio::test]
    async fn function_globals_and_frames_are_unreachable() {
        require_python!();
        let sandbox = PythonSandbox::default();
        let outcome = sandbox
            .run(&SandboxRequest::new("statistics.mean.__globals__['sys']"))
            .await;
        assert!(outcome.failure().unwrap().is_restricted());

        let outcome = sandbox
            .run(&SandboxRequest::new("g = (x for x in [1])\nresult = g.gi_frame.f_back"))
            .await;
        assert_eq!(outcome.to_string(), "Error: access to 'gi_frame' is not permitted");
    }

    #[tokio::test]
    async fn allowlisted_modules_are_filtered_too() {
        require_python!();
        let request = SandboxRequest::new(
            "import json\ntry:\n    json.codecs\n    result = 'exposed'\nexcept AttributeError:\n    result = 'hidden'",
        )
        .with_allowed_imports(["json"]);
        let outcome = PythonSandbox::default().run(&request).await;
        assert_eq!(outcome.to_string(), "hidden");

        let request = SandboxRequest::new("from json import dumps\nresult = dumps([1, 2])")
            .with_allowed_imports(["json"]);
        let outcome = PythonSandbox::default().run(&request).await;
        assert_eq!(outcome.to_string(), "[1, 2]");
    }

    #[tokio::test]
    async fn expression_evaluating_to_none_returns_none() {
        require_python!();
        let sandbox = PythonSandbox::default();
        assert_eq!(sandbox.run(&SandboxRequest::new("None")).await.to_string(), "None");
        assert_eq!(
            sandbox.run(&SandboxRequest::new("print('x')")).await.to_string(),
            "None"
        );
    }

    #[tokio::test]
    async fn infinite_loop_times_out() {
        require_python!();
        let request = SandboxRequest::new("while True:\n    pass").with_timeout(Duration::from_secs(1));
        let started = Instant::now();
        let outcome = PythonSandbox::default().run(&request).await;

        assert!(outcome.failure().unwrap().is_timeout());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn missing_interpreter_is_reported_as_text() {
        let sandbox = PythonSandbox::new(SandboxConfig {
            interpreter: "/nonexistent/python3".to_string(),
            ..SandboxConfig::default()
        });
        let outcome = sandbox.run(&SandboxRequest::new("1")).await;
        assert!(outcome.to_string().starts_with("Error: sandbox unavailable"));
    }

    #[tokio::test]
    async fn long_output_is_truncated() {
        require_python!();
        let sandbox = PythonSandbox::new(SandboxConfig {
            max_output_bytes: 100,
            ..SandboxConfig::default()
        });
        let outcome = sandbox
            .run(&SandboxRequest::new("for i in range(100):\n    print('x' * 10)"))
            .await;
        assert!(outcome.to_string().contains("output truncated"));
    }
}
