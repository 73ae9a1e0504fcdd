//! What a sandboxed snippet may import and which builtins it sees.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Modules that are never importable, whatever the caller allows.
pub const BASELINE_DENIED: &[&str] = &[
    "asyncio",
    "builtins",
    "code",
    "codeop",
    "ctypes",
    "fcntl",
    "ftplib",
    "gc",
    "http",
    "importlib",
    "inspect",
    "io",
    "marshal",
    "mmap",
    "multiprocessing",
    "os",
    "pathlib",
    "pickle",
    "posix",
    "pty",
    "resource",
    "runpy",
    "select",
    "selectors",
    "shelve",
    "shutil",
    "signal",
    "smtplib",
    "socket",
    "socketserver",
    "ssl",
    "subprocess",
    "sys",
    "sysconfig",
    "tempfile",
    "threading",
    "urllib",
    "webbrowser",
];

/// Modules present in every namespace without an import.
pub const PRELOADED: &[&str] = &["math", "statistics"];

/// Modules an allowlist may bring into the namespace.
pub const APPROVED: &[&str] = &[
    "collections",
    "datetime",
    "decimal",
    "fractions",
    "functools",
    "itertools",
    "json",
    "operator",
    "random",
    "re",
    "string",
    "textwrap",
];

/// Attributes a snippet may not touch, on top of every dunder name.
pub const RESTRICTED_ATTRIBUTES: &[&str] = &[
    "ag_code",
    "ag_frame",
    "cr_await",
    "cr_code",
    "cr_frame",
    "f_back",
    "f_builtins",
    "f_code",
    "f_globals",
    "f_locals",
    "gi_code",
    "gi_frame",
    "gi_yieldfrom",
    "mro",
    "tb_frame",
    "tb_next",
];

/// Builtins exposed to snippets.
pub const SAFE_BUILTINS: &[&str] = &[
    "__build_class__",
    "abs",
    "all",
    "any",
    "ascii",
    "bin",
    "bool",
    "bytes",
    "callable",
    "chr",
    "complex",
    "dict",
    "divmod",
    "enumerate",
    "filter",
    "float",
    "format",
    "frozenset",
    "hash",
    "hex",
    "int",
    "isinstance",
    "issubclass",
    "iter",
    "len",
    "list",
    "map",
    "max",
    "min",
    "next",
    "object",
    "oct",
    "ord",
    "pow",
    "print",
    "range",
    "repr",
    "reversed",
    "round",
    "set",
    "slice",
    "sorted",
    "str",
    "sum",
    "tuple",
    "zip",
    "ArithmeticError",
    "AssertionError",
    "AttributeError",
    "Exception",
    "IndexError",
    "KeyError",
    "LookupError",
    "NameError",
    "NotImplementedError",
    "OverflowError",
    "RuntimeError",
    "StopIteration",
    "TypeError",
    "ValueError",
    "ZeroDivisionError",
    "False",
    "None",
    "True",
];

fn owned(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

/// The import and namespace policy applied to every run.
///
/// Read from the `[sandbox.policy]` table so deployments can narrow or widen
/// the defaults, but the baseline in [`BASELINE_DENIED`] is always added back
/// by [`SandboxPolicy::denied_with`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxPolicy {
    /// Modules denied in addition to the baseline
    pub denied_imports: BTreeSet<String>,
    /// Modules always present in the namespace
    pub preloaded: BTreeSet<String>,
    /// Modules an allowlist may materialize
    pub approved: BTreeSet<String>,
    /// Builtins visible to the snippet
    pub builtins: BTreeSet<String>,
}

impl Default for SandboxPolicy {
    fn default() -> Self {
        Self {
            denied_imports: BTreeSet::new(),
            preloaded: owned(PRELOADED),
            approved: owned(APPROVED),
            builtins: owned(SAFE_BUILTINS),
        }
    }
}

impl SandboxPolicy {
    /// Returns the effective denied set for one run.
    #[must_use]
    pub fn denied_with(&self, extra: &BTreeSet<String>) -> BTreeSet<String> {
        let mut denied = owned(BASELINE_DENIED);
        denied.extend(self.denied_imports.iter().cloned());
        denied.extend(extra.iter().cloned());
        denied
    }

    /// Returns true if `module` may be brought in by an allowlist.
    #[must_use]
    pub fn is_materializable(&self, module: &str) -> bool {
        self.approved.contains(module) || self.preloaded.contains(module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_survives_an_empty_policy() {
        let policy = SandboxPolicy {
            denied_imports: BTreeSet::new(),
            preloaded: BTreeSet::new(),
            approved: BTreeSet::new(),
            builtins: BTreeSet::new(),
        };
        let denied = policy.denied_with(&BTreeSet::new());
        assert!(denied.contains("os"));
        assert!(denied.contains("subprocess"));
    }

    #[test]
    fn caller_additions_extend_the_denied_set() {
        let extra = owned(&["json"]);
        let denied = SandboxPolicy::default().denied_with(&extra);
        assert!(denied.contains("json"));
        assert!(denied.contains("socket"));
    }

    #[test]
    fn safe_builtins_exclude_escape_hatches() {
        let policy = SandboxPolicy::default();
        for name in ["open", "eval", "exec", "compile", "globals", "getattr", "__import__", "input"] {
            assert!(!policy.builtins.contains(name), "{name} must not be exposed");
        }
        assert!(policy.builtins.contains("print"));
    }

    #[test]
    fn materializable_covers_approved_and_preloaded() {
        let policy = SandboxPolicy::default();
        assert!(policy.is_materializable("json"));
        assert!(policy.is_materializable("math"));
        assert!(!policy.is_materializable("numpy"));
        assert!(!policy.is_materializable("os"));
    }

    #[test]
    fn approved_and_denied_are_disjoint() {
        let denied = SandboxPolicy::default().denied_with(&BTreeSet::new());
        for name in APPROVED.iter().chain(PRELOADED) {
            assert!(!denied.contains(*name), "{name} is both approved and denied");
        }
    }

    #[test]
    fn frame_walking_attributes_are_restricted() {
        for name in ["f_globals", "f_back", "gi_frame", "tb_frame"] {
            assert!(RESTRICTED_ATTRIBUTES.contains(&name), "{name} must be restricted");
        }
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let policy: SandboxPolicy = toml::from_str("denied_imports = [\"random\"]").unwrap();
        assert!(policy.denied_imports.contains("random"));
        assert!(policy.approved.contains("json"));
    }
}
