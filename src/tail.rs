//! Minimal `tail -f`.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use log::debug;

use crate::error::{Result, TailError};

/// Follows a reader, handing out complete lines as they appear.
pub struct Tailer<R> {
    reader: BufReader<R>,
    pending: Vec<u8>,
}

impl<R: Read + Seek> Tailer<R> {
    /// Starts following at the current end of `reader`.
    pub fn from_end(mut reader: R) -> io::Result<Self> {
        reader.seek(SeekFrom::End(0))?;
        Ok(Self {
            reader: BufReader::new(reader),
            pending: Vec::new(),
        })
    }
}

impl<R: Read> Tailer<R> {
    /// Reads everything currently available and returns the complete lines.
    ///
    /// A trailing fragment without a newline is kept for the next poll.
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn poll(&mut self) -> io::Result<Vec<String>> {
        let mut lines = Vec::new();
        loop {
            let read = self.reader.read_until(b'\n', &mut self.pending)?;
            if read == 0 {
                return Ok(lines);
            }
            if self.pending.last() != Some(&b'\n') {
                continue;
            }

            self.pending.pop();
            if self.pending.last() == Some(&b'\r') {
                self.pending.pop();
            }
            lines.push(String::from_utf8_lossy(&self.pending).into_owned());
            self.pending.clear();
        }
    }
}

/// Prints lines appended to `path` until the process is terminated.
pub fn tail_file(path: &Path, interval: Duration) -> Result<()> {
    if !path.exists() {
        return Err(TailError::NotFound(path.to_path_buf()).into());
    }

    let read_failed = |source| TailError::ReadFailed {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_failed)?;
    let mut tailer = Tailer::from_end(file).map_err(read_failed)?;
    debug!("following {} every {:?}", path.display(), interval);

    let stdout = io::stdout();
    loop {
        let lines = tailer.poll().map_err(read_failed)?;
        if lines.is_empty() {
            thread::sleep(interval);
            continue;
        }

        let mut out = stdout.lock();
        for line in lines {
            writeln!(out, "{line}")?;
        }
        out.flush()?;
    }
}
