//! Entry point of the `storm` build tool.
//!
//! Argument handling, configuration, and the pipeline live in
//! [`storm::run`]; the binary only supplies the process streams.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    storm::run(std::env::args_os(), &mut stdout, &mut stderr)
}
