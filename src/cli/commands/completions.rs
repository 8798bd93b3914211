use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::args::Cli;

/// Generate the completion script for `shell`.
#[must_use]
pub fn completions(shell: Shell) -> String {
    let mut cmd = Cli::command();
    let mut buf = Vec::new();
    clap_complete::generate(shell, &mut cmd, "worktime", &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_mention_subcommands() {
        let script = completions(Shell::Bash);
        assert!(script.contains("worktime"));
        assert!(script.contains("report"));

        assert!(completions(Shell::Fish).contains("backup"));
    }
}
