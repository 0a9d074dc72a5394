//! Shell completion generation for autocomplete
//!
//! Generates completion scripts for bash, zsh and fish from the clap
//! command definition.

use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io;

use crate::cli::CliArgs;
use crate::error::{ConfigError, Result};

/// Generate shell completion script on stdout
///
/// # Arguments
/// * `shell_name` - Shell type (bash, zsh, fish)
pub fn generate_completion(shell_name: &str) -> Result<()> {
    let shell = parse_shell(shell_name)?;
    write_completion(shell, &mut io::stdout());
    Ok(())
}

/// Write the completion script for `shell` into `out`
pub fn write_completion<W: io::Write>(shell: Shell, out: &mut W) {
    let mut cmd = CliArgs::command();
    generate(shell, &mut cmd, "autocomplete", out);
}

/// Parse shell name string to Shell enum
fn parse_shell(shell_name: &str) -> Result<Shell> {
    match shell_name.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        _ => Err(ConfigError::Generic(format!(
            "Unsupported shell: {shell_name}. Supported shells: bash, zsh, fish"
        ))
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shell() {
        assert_eq!(parse_shell("BASH").unwrap(), Shell::Bash);
        assert_eq!(parse_shell("fish").unwrap(), Shell::Fish);
        assert!(parse_shell("powershell").is_err());
    }

    #[test]
    fn test_bash_script_mentions_subcommands() {
        let mut buffer = Vec::new();
        write_completion(Shell::Bash, &mut buffer);
        let script = String::from_utf8_lossy(&buffer);
        assert!(script.contains("autocomplete"));
        assert!(script.contains("replay"));
    }
}
