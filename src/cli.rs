//! Command-line interface definitions.
//!
//! Every flag is optional; running with no arguments polls every source,
//! translates and writes `index.html` in the current directory.

use clap::Parser;
use std::path::PathBuf;

/// Build a one-page digest of the configured sources.
///
/// # Examples
///
/// ```sh
/// # Full run
/// daily_digest
///
/// # Two sources only, no translation, custom output path
/// daily_digest -s every -s technium --no-translate -o /tmp/digest.html
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the generated page
    #[arg(short, long, default_value = "index.html")]
    pub output: PathBuf,

    /// Poll only these source keys (repeatable); unknown keys are ignored
    #[arg(short, long = "source", value_name = "KEY")]
    pub sources: Vec<String>,

    /// Skip machine translation
    #[arg(long)]
    pub no_translate: bool,

    /// Name used in the page greeting
    #[arg(long, default_value = "Matsuco")]
    pub reader_name: String,
}
