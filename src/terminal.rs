//! Terminal output
//!
//! Frames are written raw: a clear-screen and cursor-home sequence followed by
//! the frame text, flushed in one go.

use crossterm::terminal;
use crossterm::tty::IsTty;
use std::io::{self, BufWriter, Stdout, Write};
use std::time::Duration;

/// `ESC[2J` clears the screen, `ESC[H` homes the cursor
pub const CLEAR_AND_HOME: &str = "\x1b[2J\x1b[H";

/// Buffered frame writer
pub struct TerminalDisplay<W: Write = Stdout> {
    buffer: BufWriter<W>,
    frames_written: u64,
}

impl TerminalDisplay<Stdout> {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for TerminalDisplay<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> TerminalDisplay<W> {
    pub fn with_writer(writer: W) -> Self {
        Self {
            buffer: BufWriter::new(writer),
            frames_written: 0,
        }
    }

    /// Clear the screen and draw one frame
    pub fn present(&mut self, frame: &str) -> io::Result<()> {
        self.buffer.write_all(CLEAR_AND_HOME.as_bytes())?;
        self.buffer.write_all(frame.as_bytes())?;
        self.buffer.flush()?;
        self.frames_written += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

impl<W: Write> Drop for TerminalDisplay<W> {
    fn drop(&mut self) {
        let _ = self.buffer.flush();
    }
}

/// True when a `columns` x `rows` terminal can show a frame of `needed` size
pub fn frame_fits(columns: u16, rows: u16, needed: (usize, usize)) -> bool {
    columns as usize >= needed.0 && rows as usize >= needed.1
}

/// Warn when the terminal behind stdout is too small for a frame.
///
/// Returns the detected size, or `None` when stdout is not a terminal.
pub fn check_size(needed: (usize, usize)) -> Option<(u16, u16)> {
    check_size_of(&io::stdout(), needed)
}

/// Same as [`check_size`] for an arbitrary output handle. Piped or redirected
/// output is skipped, since crossterm reports a fallback size for it.
pub fn check_size_of<T: IsTty>(output: &T, needed: (usize, usize)) -> Option<(u16, u16)> {
    if !output.is_tty() {
        tracing::debug!("output is not a terminal, skipping size check");
        return None;
    }

    match terminal::size() {
        Ok((columns, rows)) => {
            if !frame_fits(columns, rows, needed) {
                tracing::warn!(
                    columns,
                    rows,
                    needed_columns = needed.0,
                    needed_rows = needed.1,
                    "terminal is smaller than a frame; output will wrap"
                );
            }
            Some((columns, rows))
        }
        Err(e) => {
            tracing::debug!(error = %e, "could not query terminal size");
            None
        }
    }
}

/// Wait between frames
pub fn pause(interval: Duration) {
    if !interval.is_zero() {
        std::thread::sleep(interval);
    }
}
