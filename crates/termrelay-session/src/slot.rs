//! Sources of the shared screen.
//!
//! A slot owns the [`Grid`] every client mirrors. [`PtySlot`] runs a program
//! on a pseudo-terminal and interprets its output; [`StaticSlot`] holds a
//! screen fed up front.

use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use std::io::{ErrorKind, Read, Write};
use tracing::{debug, error, info, warn};

use termrelay_core::{Dimensions, Error, RelayConfig, Result};
use termrelay_emulator::Grid;

/// Reads per poll before yielding back to the caller.
const MAX_READS_PER_POLL: usize = 64;

/// The shared screen and whatever produces it.
pub trait Slot: Send {
    /// Current screen.
    fn grid(&self) -> &Grid;

    /// Pull pending output into the grid. Returns the number of bytes consumed.
    fn poll(&mut self) -> Result<usize>;

    /// Deliver keystrokes to the source.
    fn send_input(&mut self, input: &[u8]) -> Result<()>;

    /// Change the source's screen size.
    fn resize(&mut self, dimensions: Dimensions) -> Result<()>;

    /// Whether the source is still producing output.
    fn is_alive(&mut self) -> bool;
}

/// A program running on a pseudo-terminal.
pub struct PtySlot {
    command: String,
    master: Box<dyn MasterPty + Send>,
    child: Box<dyn Child + Send + Sync>,
    reader: Box<dyn Read + Send>,
    writer: Box<dyn Write + Send>,
    grid: Grid,
}

impl std::fmt::Debug for PtySlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PtySlot")
            .field("command", &self.command)
            .field("dimensions", &self.grid.dimensions())
            .finish_non_exhaustive()
    }
}

impl PtySlot {
    /// Spawn the configured program.
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        let program = &config.program;
        let mut slot = Self::spawn(
            &program.command,
            &program.args,
            config.terminal.default_dimensions(),
            program.cwd.clone(),
        )?;
        slot.grid = Grid::new(slot.grid.dimensions()).with_carry_limit(config.terminal.carry_limit);
        Ok(slot)
    }

    /// Spawn `command` on a new pseudo-terminal of the given size.
    ///
    /// # Example
    /// ```no_run
    /// use termrelay_core::Dimensions;
    /// use termrelay_session::PtySlot;
    ///
    /// # fn example() -> termrelay_core::Result<()> {
    /// let slot = PtySlot::spawn("/bin/sh", &[], Dimensions::new(24, 80), None)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn spawn(
        command: &str,
        args: &[String],
        dimensions: Dimensions,
        cwd: Option<String>,
    ) -> Result<Self> {
        let dimensions = dimensions.non_empty();
        info!(
            "Spawning slot: command='{}' args={:?}, dimensions={}, cwd={:?}",
            command, args, dimensions, cwd
        );

        let pair = native_pty_system()
            .openpty(pty_size(dimensions))
            .map_err(|e| {
                error!("Failed to open PTY: {}", e);
                Error::Pty(format!("Failed to open PTY: {e}"))
            })?;

        let mut cmd = CommandBuilder::new(command);
        for arg in args {
            cmd.arg(arg);
        }
        if let Some(dir) = cwd {
            cmd.cwd(dir);
        }

        let child = pair.slave.spawn_command(cmd).map_err(|e| {
            error!("Failed to spawn command '{}': {}", command, e);
            Error::Pty(format!("Failed to spawn command: {e}"))
        })?;

        let writer = pair
            .master
            .take_writer()
            .map_err(|e| Error::Pty(format!("Failed to take writer: {e}")))?;
        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| Error::Pty(format!("Failed to clone reader: {e}")))?;

        // poll() must never block the ticker.
        #[cfg(unix)]
        {
            if let Some(fd) = pair.master.as_raw_fd() {
                // SAFETY: fd belongs to the master we hold; only its status flags change.
                unsafe {
                    let flags = libc::fcntl(fd, libc::F_GETFL, 0);
                    if flags == -1 || libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) == -1
                    {
                        error!("Failed to set master PTY to non-blocking mode");
                    }
                }
            }
        }

        info!("Slot spawned: command='{}'", command);

        Ok(Self {
            command: command.to_string(),
            master: pair.master,
            child,
            reader,
            writer,
            grid: Grid::new(dimensions),
        })
    }

    /// Command line the slot was started with.
    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Slot for PtySlot {
    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn poll(&mut self) -> Result<usize> {
        let mut buf = [0u8; 4096];
        let mut total = 0;
        for _ in 0..MAX_READS_PER_POLL {
            match self.reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    self.grid.feed(&buf[..n]);
                    total += n;
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                // Linux reports EIO once the child side has closed.
                Err(e) if total > 0 => {
                    debug!("PTY read stopped after {} bytes: {}", total, e);
                    break;
                }
                Err(e) => return Err(Error::Io(e)),
            }
        }
        Ok(total)
    }

    fn send_input(&mut self, input: &[u8]) -> Result<()> {
        if input.is_empty() {
            return Ok(());
        }
        self.writer.write_all(input)?;
        self.writer.flush()?;
        Ok(())
    }

    fn resize(&mut self, dimensions: Dimensions) -> Result<()> {
        let dimensions = dimensions.non_empty();
        self.master
            .resize(pty_size(dimensions))
            .map_err(|e| Error::Pty(format!("Failed to resize PTY: {e}")))?;
        self.grid.resize(dimensions);
        Ok(())
    }

    fn is_alive(&mut self) -> bool {
        self.child.try_wait().ok().flatten().is_none()
    }
}

impl Drop for PtySlot {
    fn drop(&mut self) {
        if self.is_alive() {
            if let Err(e) = self.child.kill() {
                warn!("Failed to kill '{}': {}", self.command, e);
            }
        }
    }
}

fn pty_size(dimensions: Dimensions) -> PtySize {
    PtySize {
        rows: dimensions.rows,
        cols: dimensions.cols,
        pixel_width: 0,
        pixel_height: 0,
    }
}

/// A fixed screen, for demos and tests.
///
/// Input is recorded rather than delivered anywhere.
#[derive(Debug, Clone)]
pub struct StaticSlot {
    grid: Grid,
    received: Vec<u8>,
    alive: bool,
}

impl StaticSlot {
    /// Wrap an existing grid.
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            received: Vec::new(),
            alive: true,
        }
    }

    /// Build a screen by feeding `bytes` into a fresh grid.
    pub fn from_bytes(dimensions: Dimensions, bytes: &[u8]) -> Self {
        let mut grid = Grid::new(dimensions);
        grid.feed(bytes);
        Self::new(grid)
    }

    /// Feed more output into the screen.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.grid.feed(bytes);
    }

    /// Input delivered so far.
    pub fn received(&self) -> &[u8] {
        &self.received
    }

    /// Mark the source as finished.
    pub fn finish(&mut self) {
        self.alive = false;
    }
}

impl Slot for StaticSlot {
    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn poll(&mut self) -> Result<usize> {
        Ok(0)
    }

    fn send_input(&mut self, input: &[u8]) -> Result<()> {
        self.received.extend_from_slice(input);
        Ok(())
    }

    fn resize(&mut self, dimensions: Dimensions) -> Result<()> {
        if dimensions.rows == 0 || dimensions.cols == 0 {
            return Err(Error::InvalidDimensions {
                rows: dimensions.rows,
                cols: dimensions.cols,
            });
        }
        self.grid.resize(dimensions);
        Ok(())
    }

    fn is_alive(&mut self) -> bool {
        self.alive
    }
}
