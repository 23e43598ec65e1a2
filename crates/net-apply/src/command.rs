//! External command execution
//!
//! Every operation of this crate that touches the system goes through
//! [`CommandRunner`]. Calls block until the child exits and, for
//! [`CommandRunner::capture`], until its output is fully drained. There
//! is no timeout; callers needing one must wrap the call.

use std::fmt;
use std::io::{self, Read};
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use log::debug;

/// One external command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Build from a full `argv`; `None` if it is empty
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program).args(args.iter().cloned()))
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Exit code and merged stdout/stderr of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `-N` when the child was killed by signal `N`
    pub exit_code: i32,
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Process spawning capability
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Run with inherited stdio and return the exit code
    fn call(&self, invocation: &Invocation) -> io::Result<i32>;

    /// Run with stdout and stderr merged into one pipe and return everything it wrote
    fn capture(&self, invocation: &Invocation) -> io::Result<CommandOutput>;
}

/// [`CommandRunner`] spawning real processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }

    fn command(invocation: &Invocation) -> Command {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args).stdin(Stdio::null());
        cmd
    }
}

impl CommandRunner for SystemCommandRunner {
    fn call(&self, invocation: &Invocation) -> io::Result<i32> {
        debug!("command: {}", invocation);

        let status = Self::command(invocation).status()?;
        Ok(exit_code(status))
    }

    fn capture(&self, invocation: &Invocation) -> io::Result<CommandOutput> {
        debug!("command: {}", invocation);

        let (mut reader, writer) = io::pipe()?;
        let mut child = {
            let mut cmd = Self::command(invocation);
            cmd.stdout(writer.try_clone()?).stderr(writer);
            // `cmd` owns the parent's write ends; dropped here so the read sees EOF
            cmd.spawn()?
        };

        let mut buffer = Vec::new();
        let read_result = reader.read_to_end(&mut buffer);
        let status = child.wait()?;
        read_result?;

        Ok(CommandOutput {
            exit_code: exit_code(status),
            output: String::from_utf8_lossy(&buffer).into_owned(),
        })
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|signal| -signal))
        .unwrap_or(-1)
}
