use anyhow::{Context, Result, anyhow, bail};
use log::debug;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

/// Environment variable naming the ngspice executable.
pub const NGSPICE_ENV: &str = "NGSPICE";

#[cfg(target_os = "macos")]
const DEFAULT_LOCATIONS: &[&str] = &["/opt/homebrew/bin/ngspice", "/usr/local/bin/ngspice"];

#[cfg(target_os = "windows")]
const DEFAULT_LOCATIONS: &[&str] = &[r"C:\Program Files\ngspice\bin\ngspice.exe"];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const DEFAULT_LOCATIONS: &[&str] = &["/usr/bin/ngspice", "/usr/local/bin/ngspice"];

/// Replace a leading `~` with the home directory.
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix('~'), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest.trim_start_matches(['/', '\\'])),
        _ => PathBuf::from(path),
    }
}

/// `$NGSPICE` when set, else the first default location that exists, else
/// the first default location.
fn ngspice_path() -> PathBuf {
    if let Some(path) = std::env::var(NGSPICE_ENV).ok().filter(|p| !p.is_empty()) {
        return expand_home(&path);
    }
    DEFAULT_LOCATIONS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCATIONS[0]))
}

fn install_hint() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install it with `brew install ngspice`."
    } else if cfg!(target_os = "windows") {
        "Download it from https://ngspice.sourceforge.io/download.html."
    } else {
        "Install it with your package manager, e.g. `apt install ngspice`."
    }
}

/// Outcome of a batch ngspice run.
pub struct SimulationResult {
    pub success: bool,
    /// Combined stdout and stderr.
    pub output: String,
}

/// Locate a working ngspice executable.
pub fn check_ngspice_installed() -> Result<PathBuf> {
    let path = ngspice_path();
    if !path.exists() {
        bail!(
            "ngspice not found at {}\n{} Set {NGSPICE_ENV} to use another location.",
            path.display(),
            install_hint()
        );
    }

    let probe = Command::new(&path)
        .arg("--version")
        .output()
        .with_context(|| format!("Failed to execute ngspice at {}", path.display()))?;
    if !probe.status.success() {
        bail!("ngspice at {} exited with {}", path.display(), probe.status);
    }
    Ok(path)
}

/// Default timeout for ngspice simulations (5 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Run ngspice in batch mode on `cir_path`, capturing output.
///
/// `work_dir` is the working directory for ngspice. The process is killed
/// once [`DEFAULT_TIMEOUT`] elapses.
pub fn run_ngspice_captured(cir_path: &Path, work_dir: &Path) -> Result<SimulationResult> {
    let ngspice = check_ngspice_installed()?;
    debug!("Running {} -b {}", ngspice.display(), cir_path.display());

    let handle = duct::cmd(&ngspice, [OsStr::new("-b"), cir_path.as_os_str()])
        .dir(work_dir)
        .stderr_to_stdout()
        .stdout_capture()
        .unchecked()
        .start()
        .context("Failed to execute ngspice")?;

    let started = Instant::now();
    loop {
        if let Some(output) = handle.try_wait().context("Failed to wait for ngspice")? {
            return Ok(SimulationResult {
                success: output.status.success(),
                output: String::from_utf8_lossy(&output.stdout).into_owned(),
            });
        }
        if started.elapsed() >= DEFAULT_TIMEOUT {
            handle.kill().context("Failed to stop ngspice")?;
            return Err(anyhow!(
                "ngspice did not finish within {}s",
                DEFAULT_TIMEOUT.as_secs()
            ));
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}
