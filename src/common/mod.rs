//! Common functionality.

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

pub mod io;

pub use io::{open_read_maybe_gz, open_write_maybe_gz, read_lines};

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            verbose: Verbosity::new(0, 0),
        }
    }
}

/// Expand path arguments, reading through files given by `@path`.
///
/// Each `@path` argument is replaced by the non-empty, trimmed lines of the file
/// at `path`; all other arguments are passed through unchanged.
pub fn expand_path_args(args: &[String]) -> Result<Vec<String>, anyhow::Error> {
    let mut result = Vec::new();
    for arg in args {
        if let Some(path) = arg.strip_prefix('@') {
            for line in read_lines(path)
                .map_err(|e| anyhow::anyhow!("could not open list file {}: {}", path, e))?
            {
                let line = line?;
                let line = line.trim();
                if !line.is_empty() {
                    result.push(line.to_string());
                }
            }
        } else {
            result.push(arg.clone());
        }
    }
    Ok(result)
}

/// The version of `surveillance-overview` package.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
