//! Configuration types for the terminal relay.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Dimensions, Error};

/// Relay configuration loaded from YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Server settings
    pub server: ServerSettings,
    /// Terminal settings
    pub terminal: TerminalSettings,
    /// Telnet transport settings
    pub telnet: TelnetSettings,
    /// Program run inside the shared slot
    pub program: ProgramSettings,
}

impl RelayConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        let config: RelayConfig =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> crate::Result<()> {
        if self.server.max_clients == 0 {
            return Err(Error::Config("server.max_clients must be > 0".into()));
        }

        if self.server.tick_ms == 0 {
            return Err(Error::Config("server.tick_ms must be > 0".into()));
        }

        let t = &self.terminal;
        if t.default_rows == 0 || t.default_cols == 0 || t.max_rows == 0 || t.max_cols == 0 {
            return Err(Error::Config("terminal dimensions must be > 0".into()));
        }

        if t.default_rows > t.max_rows || t.default_cols > t.max_cols {
            return Err(Error::Config(format!(
                "terminal default size {}x{} exceeds maximum {}x{}",
                t.default_cols, t.default_rows, t.max_cols, t.max_rows
            )));
        }

        if t.carry_limit == Some(0) {
            return Err(Error::Config("terminal.carry_limit must be > 0".into()));
        }

        if self.telnet.flush_chunk_size == 0 {
            return Err(Error::Config("telnet.flush_chunk_size must be > 0".into()));
        }

        if self.program.command.trim().is_empty() {
            return Err(Error::Config("program.command cannot be empty".into()));
        }

        Ok(())
    }
}

/// Server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to listen on
    pub bind_address: String,
    /// TCP port to listen on
    pub port: u16,
    /// Maximum number of concurrently connected clients
    pub max_clients: usize,
    /// Interval between relay ticks in milliseconds
    pub tick_ms: u64,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            max_clients: 32,
            tick_ms: 50,
            log_level: "info".to_string(),
        }
    }
}

impl ServerSettings {
    /// `address:port` string suitable for binding a listener.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Terminal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalSettings {
    /// Default terminal rows
    pub default_rows: u16,
    /// Default terminal columns
    pub default_cols: u16,
    /// Largest client terminal height accepted from NAWS
    pub max_rows: u16,
    /// Largest client terminal width accepted from NAWS
    pub max_cols: u16,
    /// Upper bound on buffered incomplete escape-sequence bytes (unbounded if unset)
    pub carry_limit: Option<usize>,
    /// Swap red and blue channels in client output
    pub red_blue_swap: bool,
}

impl Default for TerminalSettings {
    fn default() -> Self {
        Self {
            default_rows: 24,
            default_cols: 80,
            max_rows: 300,
            max_cols: 300,
            carry_limit: None,
            red_blue_swap: false,
        }
    }
}

impl TerminalSettings {
    /// Default terminal dimensions.
    pub fn default_dimensions(&self) -> Dimensions {
        Dimensions::new(self.default_rows, self.default_cols)
    }

    /// Maximum accepted client dimensions.
    pub fn max_dimensions(&self) -> Dimensions {
        Dimensions::new(self.max_rows, self.max_cols)
    }
}

/// Telnet transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelnetSettings {
    /// Bytes gathered from the packet queue per transport write
    pub flush_chunk_size: usize,
}

impl Default for TelnetSettings {
    fn default() -> Self {
        Self {
            flush_chunk_size: 1000,
        }
    }
}

/// Program run inside the shared slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramSettings {
    /// Command to execute
    pub command: String,
    /// Command arguments
    pub args: Vec<String>,
    /// Working directory
    pub cwd: Option<String>,
}

impl Default for ProgramSettings {
    fn default() -> Self {
        Self {
            command: "/bin/sh".to_string(),
            args: vec![],
            cwd: None,
        }
    }
}
