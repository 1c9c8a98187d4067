//! Locating and running the external tools the pipeline shells out to.
//!
//! Both `tesseract` and `pdftoppm` are discovered the same way. An explicit path
//! from configuration is used alone: if it does not exist the tool is unavailable.
//! Otherwise the search covers environment overrides, well-known install locations
//! and `PATH`. Children run with their output redirected to files, so
//! polling for a deadline can never deadlock on a full pipe.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How to find one external executable.
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub env_vars: &'static [&'static str],
    pub binaries: &'static [&'static str],
    pub install_hint: &'static str,
}

pub const TESSERACT: ToolSpec = ToolSpec {
    name: "tesseract",
    env_vars: &["DOCINTAKE_TESSERACT_PATH", "TESSERACT_PATH"],
    binaries: &["tesseract", "tesseract.exe"],
    install_hint: "Install: macOS: 'brew install tesseract tesseract-lang', \
Linux: 'apt install tesseract-ocr tesseract-ocr-rus', \
Windows: 'winget install UB-Mannheim.TesseractOCR'. \
For a custom location set DOCINTAKE_TESSERACT_PATH to the tesseract executable.",
};

pub const PDFTOPPM: ToolSpec = ToolSpec {
    name: "pdftoppm",
    env_vars: &["DOCINTAKE_PDFTOPPM_PATH"],
    binaries: &["pdftoppm", "pdftoppm.exe"],
    install_hint: "Install poppler: macOS: 'brew install poppler', Linux: 'apt install poppler-utils'. \
For a custom location set DOCINTAKE_PDFTOPPM_PATH to the pdftoppm executable.",
};

fn candidates(spec: &ToolSpec) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    let mut push_candidate = |path: PathBuf| {
        if seen.insert(path.clone()) {
            candidates.push(path);
        }
    };

    for var in spec.env_vars {
        if let Some(value) = env::var_os(var).filter(|v| !v.is_empty()) {
            push_candidate(PathBuf::from(value));
        }
    }

    if cfg!(target_os = "windows") && spec.name == "tesseract" {
        push_candidate(PathBuf::from("C:\\Program Files\\Tesseract-OCR\\tesseract.exe"));
    }

    if let Some(prefix) = env::var_os("HOMEBREW_PREFIX") {
        let prefix_path = PathBuf::from(prefix);
        for binary in spec.binaries {
            push_candidate(prefix_path.join("bin").join(binary));
        }
    }

    if let Some(path_env) = env::var_os("PATH") {
        for dir in env::split_paths(&path_env) {
            for binary in spec.binaries {
                push_candidate(dir.join(binary));
            }
        }
    }

    candidates
}

fn is_file(path: &Path) -> bool {
    fs::metadata(path).map(|metadata| metadata.is_file()).unwrap_or(false)
}

/// The executable for `spec`.
///
/// With an `explicit` path only that path is checked; a missing configured binary is
/// never replaced by another one found on the system.
pub fn locate_binary(spec: &ToolSpec, explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => is_file(path).then(|| path.to_path_buf()),
        None => candidates(spec).into_iter().find(|candidate| is_file(candidate)),
    }
}

/// Message for a tool that [`locate_binary`] could not find.
pub fn not_found_message(spec: &ToolSpec, explicit: Option<&Path>) -> String {
    match explicit {
        Some(path) => format!(
            "{} was not found at the configured path {}. Fix the path or remove it to search PATH. {}",
            spec.name,
            path.display(),
            spec.install_hint
        ),
        None => format!("{} was not found. {}", spec.name, spec.install_hint),
    }
}

/// Message for a tool that was found but could not be started.
pub fn unavailable_message(spec: &ToolSpec, detail: &str) -> String {
    format!("{} could not be started: {}. {}", spec.name, detail, spec.install_hint)
}

#[derive(Debug)]
pub enum WaitOutcome {
    Exited(ExitStatus),
    TimedOut,
}

/// Spawn `command` and wait for it, killing the child if `timeout` elapses.
///
/// The caller owns stdio redirection. Spawn errors are returned as-is so the caller
/// can tell a missing executable from a failed run.
pub fn run_with_timeout(command: &mut Command, timeout: Option<Duration>) -> io::Result<WaitOutcome> {
    let mut child = command.spawn()?;

    let Some(timeout) = timeout else {
        return child.wait().map(WaitOutcome::Exited);
    };

    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(WaitOutcome::Exited(status));
        }
        if started.elapsed() >= timeout {
            kill_and_reap(&mut child);
            return Ok(WaitOutcome::TimedOut);
        }
        thread::sleep(POLL_INTERVAL.min(timeout.saturating_sub(started.elapsed())));
    }
}

fn kill_and_reap(child: &mut Child) {
    if let Err(err) = child.kill() {
        tracing::debug!("Failed to kill timed-out child {}: {}", child.id(), err);
    }
    let _ = child.wait();
}
