//! Command line handling.

use std::path::PathBuf;

use termrelay_core::{Error, RelayConfig, Result};

/// Usage text printed for `--help`.
pub const USAGE: &str = "\
Usage: termrelay [--config <path>] [--port <n>] [-- <command> [args...]]

Runs <command> on a pseudo-terminal and shares its screen with every
Telnet client that connects.

Options:
  -c, --config <path>  YAML configuration file
  -p, --port <n>       TCP port to listen on (overrides the config file)
  -h, --help           Print this help
";

/// Options given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    /// Configuration file to load
    pub config_path: Option<PathBuf>,
    /// Port override
    pub port: Option<u16>,
    /// Program and arguments given after `--`
    pub command: Option<Vec<String>>,
    /// `--help` was given
    pub help: bool,
}

impl CliOptions {
    /// Parse arguments, excluding the program name.
    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => options.help = true,
                "-c" | "--config" => {
                    let path = args
                        .next()
                        .ok_or_else(|| Error::Config(format!("{arg} needs a path")))?;
                    options.config_path = Some(PathBuf::from(path));
                }
                "-p" | "--port" => {
                    let value = args
                        .next()
                        .ok_or_else(|| Error::Config(format!("{arg} needs a port number")))?;
                    let port = value
                        .parse::<u16>()
                        .map_err(|e| Error::Config(format!("invalid port '{value}': {e}")))?;
                    options.port = Some(port);
                }
                "--" => {
                    let command: Vec<String> = args.by_ref().collect();
                    if command.is_empty() {
                        return Err(Error::Config("no command given after --".into()));
                    }
                    options.command = Some(command);
                }
                other => {
                    return Err(Error::Config(format!("unknown argument '{other}'")));
                }
            }
        }

        Ok(options)
    }

    /// Load the configuration file (or defaults) and apply overrides.
    pub fn load_config(&self) -> Result<RelayConfig> {
        let mut config = match &self.config_path {
            Some(path) => RelayConfig::from_file(path)?,
            None => RelayConfig::default(),
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Apply command line overrides to `config`.
    pub fn apply(&self, config: &mut RelayConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some((program, args)) = self.command.as_ref().and_then(|c| c.split_first()) {
            config.program.command = program.clone();
            config.program.args = args.to_vec();
        }
    }
}
