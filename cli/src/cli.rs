use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "lumiqr", version)]
#[command(about = "Generate styled QR codes from a description, or scan them from images", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show timing/latency information
    #[arg(long, global = true)]
    pub timing: bool,

    /// Enable verbose debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Gemini API key (overrides the stored key)
    #[arg(long, global = true, env = "LUMIQR_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini model name
    #[arg(long, global = true, env = "LUMIQR_MODEL")]
    pub model: Option<String>,

    /// Base URL of the Gemini REST API
    #[arg(long, global = true, env = "LUMIQR_BASE_URL")]
    pub base_url: Option<String>,

    /// Use this config file instead of the per-user one
    #[arg(long, global = true, env = "LUMIQR_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Describe a QR code in natural language and generate it
    Generate {
        /// What the code should contain and look like (prompted when omitted)
        prompt: Option<String>,

        /// Write the branded PNG here instead of the album
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Do not save the image anywhere
        #[arg(long, conflicts_with = "output")]
        no_save: bool,

        /// Print a terminal preview of the code
        #[arg(long, short = 'p')]
        preview: bool,
    },
    /// Scan a QR code from an image file, stdin, or the clipboard
    Scan {
        /// Image file to scan
        path: Option<PathBuf>,

        /// Read encoded image bytes from stdin
        #[arg(long, conflicts_with = "path")]
        stdin: bool,

        /// Read the image from the clipboard
        #[arg(long, conflicts_with_all = ["path", "stdin"])]
        clipboard: bool,

        /// Keep polling the clipboard until a code is found
        #[arg(long, short = 'w', conflicts_with_all = ["path", "stdin"])]
        watch: bool,

        /// Polling interval for --watch, in milliseconds
        #[arg(long, default_value = "500")]
        interval_ms: u64,

        /// Copy the decoded content to the clipboard
        #[arg(long, short = 'c')]
        copy: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Classify text and show its fields and actions, without an image
    Inspect {
        /// Text to inspect
        text: Option<String>,

        /// Read the text from stdin
        #[arg(long, conflicts_with = "text")]
        stdin: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render a QR content specification (JSON) without calling the AI
    Render {
        /// Specification file, or `-` for stdin
        spec: PathBuf,

        /// Write the branded PNG here instead of the album
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Do not save the image anywhere
        #[arg(long, conflicts_with = "output")]
        no_save: bool,

        /// Print a terminal preview of the code
        #[arg(long, short = 'p')]
        preview: bool,
    },
    /// Manage the stored API key and settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Store the Gemini API key (prompted with hidden input when omitted)
    SetKey { key: Option<String> },
    /// Show the effective settings
    Show,
    /// Remove the stored API key
    ClearKey,
    /// Set the directory generated images are saved to
    SetAlbum { dir: PathBuf },
}
