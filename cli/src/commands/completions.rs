//! Shell completions generation command.

use std::io::Write;

use anyhow::{Context as _, Result};
use clap::CommandFactory as _;
use clap_complete::Shell;

use crate::cli::Cli;

pub fn generate_completions(shell: Shell) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write_completions(shell, &mut stdout);
    stdout.flush().context("Failed to write completions")
}

pub fn write_completions(shell: Shell, writer: &mut dyn Write) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "lumiqr", writer);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bash_completions_cover_subcommands() {
        let mut buffer = Vec::new();
        write_completions(Shell::Bash, &mut buffer);
        let script = String::from_utf8(buffer).unwrap();
        assert!(script.contains("lumiqr"));
        assert!(script.contains("generate"));
        assert!(script.contains("set-key"));
    }
}
