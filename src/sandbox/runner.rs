//! Child interpreter process management.
//!
//! Every run starts a fresh `python3 -I -S -B` in its own process group with
//! resource limits applied before exec. The child reads one JSON request on
//! stdin, executes the snippet against a restricted namespace, and writes one
//! JSON envelope on its real stdout.
//!
//! Modules reach the snippet only as attribute-filtered copies holding their
//! public functions, classes and constants. Dunder names and frame or code
//! attributes are refused before the snippet runs.

use crate::sandbox::DenialReason;
use serde::{Deserialize, Serialize};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

/// Python program run inside the child.
const RUNNER: &str = r#"
import ast, importlib, io, json, sys, types

CONSTANTS = (int, float, complex, str, bytes, bool, tuple, frozenset, type(None))

def describe(exc):
    text = str(exc)
    return type(exc).__name__ + (": " + text if text else "")

def first_restricted(tree, blocked):
    found = []
    for node in ast.walk(tree):
        if isinstance(node, ast.Attribute):
            names = [node.attr]
        elif isinstance(node, ast.Name):
            names = [node.id] if node.id.startswith("__") else []
        elif isinstance(node, getattr(ast, "MatchClass", ())):
            names = node.kwd_attrs
        else:
            continue
        for name in names:
            if name != "__name__" and (name.startswith("__") or name in blocked):
                found.append((node.lineno, node.col_offset, node.end_col_offset, name))
    return min(found)[-1] if found else None

def main():
    request = json.loads(sys.stdin.read())
    real_stdout = sys.stdout
    import builtins as host

    proxies = {}

    def expose(name):
        if name in proxies:
            return proxies[name]
        module = importlib.import_module(name)
        proxy = types.SimpleNamespace(**{
            key: value
            for key, value in vars(module).items()
            if not key.startswith("_")
            and not isinstance(value, types.ModuleType)
            and (callable(value) or isinstance(value, CONSTANTS))
        })
        proxies[name] = proxy
        parent, _, child = name.rpartition(".")
        if parent:
            setattr(expose(parent), child, proxy)
        return proxy

    namespace_modules = request["preload"] + request["modules"]
    for name in namespace_modules:
        expose(name)
    available = set(namespace_modules)
    denied = set(request["denied"])
    allowed = request["allowed"]
    refusals = []

    def refuse(module, reason):
        refusals.append({"module": module, "reason": reason})
        return ImportError("import of '%s' is not permitted" % module)

    def guarded_import(name, globals=None, locals=None, fromlist=(), level=0):
        top = name.partition(".")[0]
        if level:
            raise refuse("." * level + name, "relative")
        if top in denied or name in denied:
            raise refuse(name, "denied")
        if allowed is None:
            raise refuse(name, "no_allowlist")
        if top not in allowed:
            raise refuse(name, "not_allowlisted")
        if top not in available:
            raise refuse(name, "unavailable")
        proxy = expose(name)
        if not fromlist:
            return proxies[top]
        for item in fromlist:
            if item != "*" and not hasattr(proxy, item):
                try:
                    expose(name + "." + item)
                except ImportError:
                    pass
        return proxy

    safe = {n: getattr(host, n) for n in request["builtins"] if hasattr(host, n)}
    safe["__import__"] = guarded_import
    namespace = {"__builtins__": safe, "__name__": "__sandbox__"}
    for name in namespace_modules:
        namespace[name] = proxies[name]

    out, err = io.StringIO(), io.StringIO()
    envelope = {"mode": "exec", "value": None, "result": None, "error_kind": None,
                "denied": None, "restricted": None}
    try:
        try:
            tree = ast.parse(request["code"], "<sandbox>", "eval")
            envelope["mode"] = "eval"
        except SyntaxError:
            tree = ast.parse(request["code"], "<sandbox>", "exec")
        compiled = compile(tree, "<sandbox>", envelope["mode"])
    except (SyntaxError, ValueError) as exc:
        envelope["error_kind"] = "syntax"
        err.write(describe(exc))
    else:
        envelope["restricted"] = first_restricted(tree, set(request["restricted"]))
        if envelope["restricted"] is None:
            sys.stdout, sys.stderr = out, err
            try:
                value = eval(compiled, namespace)
                if envelope["mode"] == "eval":
                    envelope["value"] = str(value)
                elif "result" in namespace:
                    envelope["result"] = str(namespace["result"])
            except BaseException as exc:
                envelope["error_kind"] = "runtime"
                err.write(describe(exc))
            finally:
                sys.stdout, sys.stderr = sys.__stdout__, sys.__stderr__
            if refusals:
                envelope["denied"] = refusals[0]

    envelope["stdout"] = out.getvalue()
    envelope["stderr"] = err.getvalue()
    real_stdout.write(json.dumps(envelope))
    real_stdout.flush()

main()
"#;

/// What the child is asked to run.
#[derive(Debug, Serialize)]
pub(crate) struct RunnerRequest<'a> {
    pub code: &'a str,
    pub preload: Vec<&'a str>,
    pub modules: Vec<&'a str>,
    pub builtins: Vec<&'a str>,
    pub denied: Vec<&'a str>,
    pub allowed: Option<Vec<&'a str>>,
    pub restricted: Vec<&'a str>,
}

/// How the snippet was compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum CompileMode {
    Eval,
    Exec,
}

/// Category of a failure reported by the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ErrorKind {
    Syntax,
    Runtime,
}

/// An import the child refused while the snippet ran.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Refusal {
    pub module: String,
    pub reason: DenialReason,
}

/// The JSON document the child writes on exit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Envelope {
    pub mode: CompileMode,
    pub value: Option<String>,
    pub result: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub denied: Option<Refusal>,
    /// First restricted attribute or name found in the snippet
    pub restricted: Option<String>,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
}

/// Host-side limits for one child.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ChildLimits {
    pub timeout: Duration,
    pub memory_limit_mb: u64,
}

/// How a child run ended.
#[derive(Debug)]
pub(crate) enum ChildExit {
    /// The child wrote a readable envelope
    Finished(Envelope),
    /// The child exited without a readable envelope
    Crashed {
        status: ExitStatus,
        stderr: String,
    },
    /// The deadline passed and the process group was killed
    TimedOut,
}

/// Errors starting or talking to the child.
#[derive(Debug)]
pub(crate) struct SpawnError(pub String);

/// Runs one request in a fresh child interpreter.
pub(crate) async fn run_child(
    interpreter: &str,
    request: &RunnerRequest<'_>,
    limits: ChildLimits,
) -> Result<ChildExit, SpawnError> {
    let payload = serde_json::to_vec(request)
        .map_err(|e| SpawnError(format!("failed to encode request: {e}")))?;

    let mut cmd = Command::new(interpreter);
    cmd.args(["-I", "-S", "-B", "-c", RUNNER])
        .env_clear()
        .current_dir(std::env::temp_dir())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    harden(&mut cmd, limits);

    let mut child = cmd
        .spawn()
        .map_err(|e| SpawnError(format!("failed to start interpreter `{interpreter}`: {e}")))?;
    let pid = child.id();
    tracing::debug!(pid = ?pid, timeout_ms = limits.timeout.as_millis() as u64, "Sandbox child started");

    let (Some(mut stdin), Some(mut stdout), Some(mut stderr)) =
        (child.stdin.take(), child.stdout.take(), child.stderr.take())
    else {
        return Err(SpawnError("failed to capture interpreter pipes".to_string()));
    };

    let result = tokio::time::timeout(limits.timeout, async {
        stdin.write_all(&payload).await?;
        stdin.shutdown().await?;
        drop(stdin);

        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();
        let (out, err) = tokio::join!(
            stdout.read_to_end(&mut stdout_buf),
            stderr.read_to_end(&mut stderr_buf)
        );
        out?;
        err?;
        let status = child.wait().await?;
        Ok::<_, std::io::Error>((status, stdout_buf, stderr_buf))
    })
    .await;

    match result {
        Ok(Ok((status, stdout_buf, stderr_buf))) => {
            match serde_json::from_slice::<Envelope>(&stdout_buf) {
                Ok(envelope) => Ok(ChildExit::Finished(envelope)),
                Err(_) => Ok(ChildExit::Crashed {
                    status,
                    stderr: String::from_utf8_lossy(&stderr_buf).into_owned(),
                }),
            }
        }
        Ok(Err(e)) => {
            kill_group(pid);
            let _ = child.wait().await;
            Err(SpawnError(format!("interpreter i/o failed: {e}")))
        }
        Err(_) => {
            kill_group(pid);
            let _ = child.wait().await;
            Ok(ChildExit::TimedOut)
        }
    }
}

#[cfg(unix)]
fn kill_group(pid: Option<u32>) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Some(pid) = pid.and_then(|p| i32::try_from(p).ok()) {
        if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
            tracing::debug!(pid, error = %e, "Sandbox process group already gone");
        }
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: Option<u32>) {}

#[cfg(all(unix, feature = "sandbox-hardening"))]
fn harden(cmd: &mut Command, limits: ChildLimits) {
    use rlimit::Resource;

    let cpu = limits.timeout.as_secs() + 1;
    let memory = limits.memory_limit_mb.saturating_mul(1024 * 1024);
    cmd.process_group(0);
    // SAFETY: the closure only issues setrlimit syscalls, which are
    // async-signal-safe, and allocates nothing.
    unsafe {
        cmd.pre_exec(move || {
            rlimit::setrlimit(Resource::CPU, cpu, cpu + 1)?;
            if memory > 0 {
                rlimit::setrlimit(Resource::AS, memory, memory)?;
            }
            rlimit::setrlimit(Resource::FSIZE, 0, 0)?;
            rlimit::setrlimit(Resource::NPROC, 0, 0)?;
            Ok(())
        });
    }
}

#[cfg(all(unix, not(feature = "sandbox-hardening")))]
fn harden(cmd: &mut Command, _limits: ChildLimits) {
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn harden(_cmd: &mut Command, _limits: ChildLimits) {}

/// Describes how a child died without reporting back.
pub(crate) fn describe_crash(status: ExitStatus, stderr: &str) -> String {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("interpreter terminated by signal {signal}; a resource limit was likely exceeded");
        }
    }

    let last_line = stderr.lines().rev().find(|l| !l.trim().is_empty());
    match last_line {
        Some(line) => line.trim().to_string(),
        None => format!("interpreter exited with {status} and no result"),
    }
}

/// Cuts `text` to at most `max_bytes`, preferring a line boundary.
pub(crate) fn truncate_output(text: String, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text;
    }

    let mut cut = max_bytes;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let cut = text[..cut].rfind('\n').unwrap_or(cut);
    format!(
        "{}\n... (output truncated, {} bytes total)",
        &text[..cut],
        text.len()
    )
}
