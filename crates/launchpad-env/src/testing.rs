//! Recording fake [`ProcessRunner`] for tests.
//!
//! Classifies each call as venv creation, pip install or application launch,
//! records it, and simulates the side effects the real toolchain would have:
//! `-m venv` materializes `bin/python` + `bin/pip`, `pip install -r` writes one
//! directory per requirement under `lib/site-packages`.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::runner::{CommandSpec, ProcessOutcome, ProcessRunner};
use crate::runtime::{venv_bin_dir, venv_executable};

/// What a simulated call does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Apply the side effect (if any) and exit with this code.
    Exit(i32),
    /// Exit 0 without any side effect.
    NoEffect,
    /// Terminated by a signal.
    Signal(i32),
    /// Program could not be started.
    SpawnError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    CreateEnv,
    Install,
    Launch,
}

impl CallKind {
    pub fn of(spec: &CommandSpec) -> Self {
        if spec.args.windows(2).any(|w| w[0] == "-m" && w[1] == "venv") {
            Self::CreateEnv
        } else if spec.args.iter().any(|a| a == "install") {
            Self::Install
        } else {
            Self::Launch
        }
    }
}

#[derive(Debug)]
pub struct RecordingRunner {
    calls: Mutex<Vec<CommandSpec>>,
    venv: Behavior,
    install: Behavior,
    app: Behavior,
}

impl Default for RecordingRunner {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            venv: Behavior::Exit(0),
            install: Behavior::Exit(0),
            app: Behavior::Exit(0),
        }
    }
}

impl RecordingRunner {
    pub fn with_venv(mut self, behavior: Behavior) -> Self {
        self.venv = behavior;
        self
    }

    pub fn with_install(mut self, behavior: Behavior) -> Self {
        self.install = behavior;
        self
    }

    pub fn with_app(mut self, behavior: Behavior) -> Self {
        self.app = behavior;
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn kinds(&self) -> Vec<CallKind> {
        self.calls().iter().map(CallKind::of).collect()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, spec: &CommandSpec) -> io::Result<ProcessOutcome> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(spec.clone());
        }
        let kind = CallKind::of(spec);
        let behavior = match kind {
            CallKind::CreateEnv => self.venv,
            CallKind::Install => self.install,
            CallKind::Launch => self.app,
        };
        match behavior {
            Behavior::SpawnError => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}: not found", spec.program.display()),
            )),
            Behavior::Signal(sig) => Ok(ProcessOutcome::signaled(sig)),
            Behavior::NoEffect => Ok(ProcessOutcome::exited(0)),
            Behavior::Exit(code) => {
                if code == 0 {
                    match kind {
                        CallKind::CreateEnv => simulate_venv(spec)?,
                        CallKind::Install => simulate_pip(spec)?,
                        CallKind::Launch => {}
                    }
                }
                Ok(ProcessOutcome::exited(code))
            }
        }
    }
}

fn simulate_venv(spec: &CommandSpec) -> io::Result<()> {
    let root = spec
        .args
        .last()
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "venv without target"))?;
    std::fs::create_dir_all(venv_bin_dir(&root))?;
    std::fs::write(venv_executable(&root, "python"), "#!fake python\n")?;
    std::fs::write(venv_executable(&root, "pip"), "#!fake pip\n")?;
    Ok(())
}

fn simulate_pip(spec: &CommandSpec) -> io::Result<()> {
    let root = spec
        .env_value("VIRTUAL_ENV")
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "pip outside an environment"))?;
    let manifest = spec
        .args
        .windows(2)
        .find(|w| w[0] == "-r")
        .map(|w| PathBuf::from(&w[1]))
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "pip without -r"))?;
    let content = std::fs::read_to_string(&manifest)?;
    let site = site_packages(&root);
    std::fs::create_dir_all(&site)?;
    for line in requirement_lines(&content) {
        let name = line
            .split(|c: char| "=<>!~;[ ".contains(c))
            .next()
            .unwrap_or(line)
            .to_lowercase();
        let pkg = site.join(name);
        std::fs::create_dir_all(&pkg)?;
        std::fs::write(pkg.join("REQUIREMENT"), line)?;
    }
    Ok(())
}

fn requirement_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
}

fn site_packages(root: &Path) -> PathBuf {
    root.join("lib").join("site-packages")
}

/// Requirements "installed" by the fake pip, sorted by package name.
pub fn installed_packages(root: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(site_packages(root)) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
    dirs.sort();
    dirs.iter()
        .filter_map(|d| std::fs::read_to_string(d.join("REQUIREMENT")).ok())
        .collect()
}

