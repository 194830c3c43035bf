//! The read/print loop.

use std::io::{self, BufRead, Write};

use chord_core::RingDirectory;
use tracing::{debug, info};

use crate::commands::{Command, CommandResult};

/// A simulator session: one directory, fed one command line at a time.
#[derive(Debug)]
pub struct Session {
    directory: RingDirectory,
}

impl Session {
    /// Starts a session over a ring of `2^bits` identifiers.
    pub fn new(bits: u32) -> chord_core::Result<Self> {
        Ok(Self {
            directory: RingDirectory::new(bits)?,
        })
    }

    pub fn directory(&self) -> &RingDirectory {
        &self.directory
    }

    /// Executes one line. Failures come back as `ERROR:` output so the loop
    /// can carry on.
    pub fn execute_line(&mut self, line: &str) -> CommandResult {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return CommandResult::Silent,
            Err(e) => {
                debug!(line, error = %e, "rejected command");
                return CommandResult::Output(format!("ERROR: {e}"));
            }
        };

        match command.execute(&mut self.directory) {
            Ok(result) => result,
            Err(e) => {
                debug!(?command, error = %e, "command failed");
                CommandResult::Output(format!("ERROR: {e}"))
            }
        }
    }

    /// Reads commands until `end` or end of input, writing replies to `out`.
    /// Every node is released before returning.
    ///
    /// Lines that are not valid UTF-8 are decoded lossily, so their bad bytes
    /// surface as an invalid-argument diagnostic instead of ending the loop.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> io::Result<()> {
        let result = self.read_loop(input, &mut out);

        let released = self.directory.clear();
        info!(released, "session ended");
        result
    }

    fn read_loop<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> io::Result<()> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            match self.execute_line(line.trim_end_matches(['\n', '\r'])) {
                CommandResult::Output(text) => writeln!(out, "{text}")?,
                CommandResult::Silent => {}
                CommandResult::End => break,
            }
        }
        out.flush()
    }
}
