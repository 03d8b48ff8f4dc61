//! Parsing command-line arguments.

use clap::{App, Arg, Error, ErrorKind, Result as ClapResult};
use derivative::Derivative;
use rmaze_lib::{Maze, SolverKind};
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};

/// A run configuration, readable from a JSON, YAML or TOML file.
#[derive(Clone, Debug, Derivative, Deserialize)]
#[derivative(Default)]
#[serde(default)]
pub(crate) struct Config {
    /// Path to the maze file.
    pub(crate) maze: PathBuf,

    /// Which solver to run.
    pub(crate) solver: SolverKind,

    /// Milliseconds between animation frames.
    #[derivative(Default(value = "16"))]
    pub(crate) delay_ms: u64,
}

/// A struct to store the parse results.
pub(crate) struct Args {
    pub(crate) maze: Maze,
    pub(crate) solver: SolverKind,
    pub(crate) delay_ms: u64,
    pub(crate) no_tui: bool,
}

impl Args {
    /// Parses the command-line arguments.
    pub(crate) fn parse() -> ClapResult<Self> {
        let app = App::new(env!("CARGO_PKG_NAME"))
            .version(env!("CARGO_PKG_VERSION"))
            .author(env!("CARGO_PKG_AUTHORS"))
            .about(env!("CARGO_PKG_DESCRIPTION"))
            .arg(
                Arg::with_name("MAZE")
                    .help("Maze file in the compact binary format")
                    .required_unless("CONFIG")
                    .index(1),
            )
            .arg(
                Arg::with_name("SOLVER")
                    .help("Solving algorithm")
                    .long_help(
                        "Solving algorithm\n\
                         \"bfs\" and \"dfs\" are the single-walker baselines.\n\
                         \"race\" runs two teams of three walkers from both ends \
                         until they meet.\n\
                         \"prune\" floods dead-end corridors off the maze while a \
                         walker and a reverse search close the gap.\n",
                    )
                    .short("s")
                    .long("solver")
                    .takes_value(true)
                    .possible_values(&["bfs", "dfs", "race", "prune"])
                    .default_value("bfs"),
            )
            .arg(
                Arg::with_name("CONFIG")
                    .help("Read config from a file")
                    .long_help(
                        "Read config from a file\n\
                         Supported formats: JSON, YAML, TOML.\n\
                         When a config file is provided, the MAZE and --solver \
                         arguments are ignored.\n",
                    )
                    .short("C")
                    .long("config")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("NOTUI")
                    .help("Solves immediately and prints the result, without the TUI")
                    .short("n")
                    .long("no-tui"),
            );

        let matches = app.get_matches_safe()?;

        let config;
        if let Some(config_file) = matches.value_of("CONFIG") {
            config = read_config(Path::new(config_file))?;
        } else {
            let maze = matches.value_of("MAZE").unwrap();
            let solver = matches.value_of("SOLVER").unwrap().parse().unwrap();
            config = Config {
                maze: PathBuf::from(maze),
                solver,
                ..Config::default()
            };
        }

        let data = fs::read(&config.maze)
            .map_err(|e| Error::with_description(&e.to_string(), ErrorKind::Io))?;
        let maze = Maze::from_bytes(&data).map_err(|e| {
            Error::with_description(&format!("Invalid maze file: {}", e), ErrorKind::InvalidValue)
        })?;

        Ok(Args {
            maze,
            solver: config.solver,
            delay_ms: config.delay_ms,
            no_tui: matches.is_present("NOTUI"),
        })
    }
}

fn read_config(path: &Path) -> ClapResult<Config> {
    let data =
        fs::read(path).map_err(|e| Error::with_description(&e.to_string(), ErrorKind::Io))?;
    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_slice(&data).map_err(|e| {
            Error::with_description(&format!("Invalid config file: {}", e), ErrorKind::Io)
        }),
        Some("yaml") | Some("yml") => serde_yaml::from_slice(&data).map_err(|e| {
            Error::with_description(&format!("Invalid config file: {}", e), ErrorKind::Io)
        }),
        Some("toml") => toml::from_slice(&data).map_err(|e| {
            Error::with_description(&format!("Invalid config file: {}", e), ErrorKind::Io)
        }),
        _ => Err(Error::with_description(
            "Unsupported config file format",
            ErrorKind::InvalidValue,
        )),
    }
}
