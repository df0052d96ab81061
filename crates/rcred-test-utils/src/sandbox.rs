//! Scratch directory for CLI tests.
//!
//! Everything lives under an `assert_fs::TempDir` and is cleaned up on drop.
//! Binaries built by cargo run with the sandbox root as working directory and
//! a minimal environment, so a developer's `rcred.toml`, `RUST_LOG` or
//! `NGSPICE` never leak into a test.
//!
//! ```no_run
//! use rcred_test_utils::sandbox::Sandbox;
//!
//! let mut sb = Sandbox::new();
//! sb.write("net.sp", "C1 a 0 1p\nR1 a b 10\nC2 b 0 1p\n");
//! let out = sb.run("rcred", ["moments", "net.sp"]).unwrap();
//! assert!(out.contains("y1="));
//! ```

use assert_fs::TempDir;
use duct::Expression;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

pub struct Sandbox {
    root: TempDir,
    env: HashMap<String, String>,
}

/// Captured result of a finished process.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox {
    /// Create a new sandbox; all state is under an auto-cleaned TempDir.
    pub fn new() -> Self {
        let root = TempDir::new().expect("create sandbox TempDir");
        let mut env = HashMap::new();
        if let Ok(path) = std::env::var("PATH") {
            env.insert("PATH".into(), path);
        }
        env.insert("HOME".into(), root.path().to_string_lossy().into_owned());
        Self { root, env }
    }

    /// Absolute path to the sandbox root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Absolute path of `rel` inside the sandbox.
    pub fn path<P: AsRef<Path>>(&self, rel: P) -> PathBuf {
        self.root_path().join(rel)
    }

    /// Set an environment variable for every command run from the sandbox.
    pub fn env<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> &mut Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Write/overwrite a file relative to the sandbox root.
    pub fn write<P: AsRef<Path>, S: AsRef<[u8]>>(&mut self, rel: P, contents: S) -> &mut Self {
        let p = self.path(rel);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(p, contents).expect("write file");
        self
    }

    /// Read a file relative to the sandbox root.
    pub fn read<P: AsRef<Path>>(&self, rel: P) -> String {
        fs::read_to_string(self.path(rel)).expect("read file")
    }

    /// Build a `duct::Expression` for a cargo binary, pre-wired with the
    /// sandbox env and root as working directory.
    pub fn cmd<I>(&self, program: &str, args: I) -> Expression
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        let cargo_bin_path = assert_cmd::cargo::cargo_bin(program)
            .to_string_lossy()
            .to_string();
        let args: Vec<_> = args
            .into_iter()
            .map(|arg| arg.as_ref().to_string_lossy().to_string())
            .collect();
        duct::cmd(&cargo_bin_path, args)
            .dir(self.root_path())
            .full_env(&self.env)
    }

    /// Run a cargo binary and return stdout. Errors if the process exits with
    /// non-zero status.
    pub fn run<I>(&self, program: &str, args: I) -> Result<String, String>
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        self.cmd(program, args)
            .stderr_null()
            .read()
            .map_err(|e| format!("command failed: {e}"))
    }

    /// Run a cargo binary to completion, capturing both streams regardless of
    /// exit status.
    pub fn capture<I>(&self, program: &str, args: I) -> RunOutput
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        let output = self
            .cmd(program, args)
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()
            .expect("spawn command");
        let root = self.root_path().to_string_lossy().into_owned();
        let clean = |bytes: &[u8]| String::from_utf8_lossy(bytes).replace(&root, "[TEMP]");
        RunOutput {
            code: output.status.code(),
            stdout: clean(&output.stdout),
            stderr: clean(&output.stderr),
        }
    }
}
