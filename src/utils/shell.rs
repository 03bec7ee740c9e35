//! Shell command execution

use colored::Colorize;
use std::fmt;
use std::process::Command;
use thiserror::Error;

use super::logger::Logger;

/// Captured result of a finished shell command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// A command that exited non-zero or could not be spawned.
///
/// Carries the same output shape as a successful run so callers can report
/// whatever the tool printed before failing.
#[derive(Error, Debug, Clone)]
#[error("`{command}` failed with exit code {}: {}", .output.exit_code, .output.stderr)]
pub struct CommandError {
    pub command: String,
    pub output: CommandOutput,
}

/// Runs command lines. Every component shells out through this seam.
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &str) -> Result<CommandOutput, CommandError>;
}

/// Executes commands in the platform shell (`/bin/bash -c` or `cmd.exe /c`)
pub struct ShellRunner {
    dry_run: bool,
    log: Logger,
}

impl ShellRunner {
    pub fn new(log: Logger) -> Self {
        Self {
            dry_run: false,
            log,
        }
    }

    /// A runner that only logs what it would execute
    pub fn dry_run(log: Logger) -> Self {
        Self { dry_run: true, log }
    }

    fn shell() -> (&'static str, &'static str) {
        if cfg!(windows) {
            ("cmd.exe", "/c")
        } else {
            ("/bin/bash", "-c")
        }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> Result<CommandOutput, CommandError> {
        if self.dry_run {
            println!("  {} {}", "[DRY RUN]".cyan().bold(), command);
            return Ok(CommandOutput::default());
        }

        self.log.debug(format!("$ {}", command));

        let (shell, flag) = Self::shell();
        let output = Command::new(shell)
            .args([flag, command])
            .output()
            .map_err(|e| CommandError {
                command: command.to_string(),
                output: CommandOutput {
                    stdout: String::new(),
                    stderr: e.to_string(),
                    exit_code: -1,
                },
            })?;

        let captured = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            // None means the process was killed by a signal
            exit_code: output.status.code().unwrap_or(-1),
        };

        if output.status.success() {
            Ok(captured)
        } else {
            Err(CommandError {
                command: command.to_string(),
                output: captured,
            })
        }
    }
}

/// Quote arguments into a single command line for the shell `ShellRunner` uses
pub fn command_line<I, S>(args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if cfg!(windows) {
        cmd_command_line(args)
    } else {
        shell_words::join(args)
    }
}

/// Quote arguments for `cmd.exe /c`.
///
/// cmd only understands double quotes, so arguments with whitespace or cmd
/// metacharacters are wrapped in `"..."` and backslashes are left alone.
pub fn cmd_command_line<I, S>(args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .map(|arg| cmd_quote(arg.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn cmd_quote(arg: &str) -> String {
    const SPECIAL: &[char] = &[' ', '\t', '"', '&', '|', '<', '>', '^', '(', ')', '%', '!', ','];

    if !arg.is_empty() && !arg.contains(SPECIAL) {
        return arg.to_string();
    }

    // Inside quotes a literal quote is doubled
    format!("\"{}\"", arg.replace('"', "\"\""))
}

impl fmt::Display for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.stderr.is_empty() {
            write!(f, "{}", self.stdout)
        } else {
            write!(f, "{}\n{}", self.stdout, self.stderr)
        }
    }
}

#[cfg(test)]
pub mod testing {
    //! Recording runner shared by component tests

    use super::*;
    use std::sync::Mutex;

    /// Records every command and fails the ones matching a configured pattern
    #[derive(Default)]
    pub struct RecordingRunner {
        calls: Mutex<Vec<String>>,
        failures: Vec<String>,
        /// (trigger, pattern): fail `pattern` once a call matched `trigger`
        failures_after: Vec<(String, String)>,
        stdout: Vec<(String, String)>,
    }

    impl RecordingRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fail any command containing `pattern`
        pub fn failing_on(mut self, pattern: &str) -> Self {
            self.failures.push(pattern.to_string());
            self
        }

        /// Fail commands containing `pattern` once any earlier command contained `trigger`
        pub fn failing_after(mut self, trigger: &str, pattern: &str) -> Self {
            self.failures_after
                .push((trigger.to_string(), pattern.to_string()));
            self
        }

        /// Answer commands containing `pattern` with `stdout`
        pub fn responding(mut self, pattern: &str, stdout: &str) -> Self {
            self.stdout.push((pattern.to_string(), stdout.to_string()));
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn calls_matching(&self, pattern: &str) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter(|c| c.contains(pattern))
                .collect()
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, command: &str) -> Result<CommandOutput, CommandError> {
            let failing_after = {
                let mut calls = self.calls.lock().unwrap();
                let failing = self.failures_after.iter().any(|(trigger, pattern)| {
                    command.contains(pattern.as_str())
                        && calls.iter().any(|c| c.contains(trigger.as_str()))
                });
                calls.push(command.to_string());
                failing
            };

            if failing_after || self.failures.iter().any(|p| command.contains(p.as_str())) {
                return Err(CommandError {
                    command: command.to_string(),
                    output: CommandOutput {
                        stdout: String::new(),
                        stderr: "simulated failure".to_string(),
                        exit_code: 1,
                    },
                });
            }

            let stdout = self
                .stdout
                .iter()
                .find(|(p, _)| command.contains(p.as_str()))
                .map(|(_, out)| out.clone())
                .unwrap_or_default();

            Ok(CommandOutput {
                stdout,
                stderr: String::new(),
                exit_code: 0,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(windows))]
    #[test]
    fn test_command_line_quotes_spaces() {
        let line = command_line(["kubectl", "apply", "-f", "my dir/seed.yaml"]);
        assert_eq!(line, "kubectl apply -f 'my dir/seed.yaml'");
    }

    #[test]
    fn test_cmd_command_line_uses_double_quotes() {
        let line = cmd_command_line([
            "docker",
            "build",
            "-t",
            "seed-node-tripcode:latest",
            r"C:\Users\davim\Desktop\TripCode Workspace\seed-node-tripcode",
        ]);
        assert_eq!(
            line,
            r#"docker build -t seed-node-tripcode:latest "C:\Users\davim\Desktop\TripCode Workspace\seed-node-tripcode""#
        );
    }

    #[test]
    fn test_cmd_command_line_leaves_backslash_paths_bare() {
        let line = cmd_command_line([
            "kubectl",
            "apply",
            "-f",
            r"C:\Users\davim\AppData\Local\Temp\validator-node-1a2b.yaml",
        ]);
        assert_eq!(
            line,
            r"kubectl apply -f C:\Users\davim\AppData\Local\Temp\validator-node-1a2b.yaml"
        );
    }

    #[test]
    fn test_cmd_command_line_escapes_quotes_and_empty() {
        assert_eq!(cmd_command_line(["echo", ""]), r#"echo """#);
        assert_eq!(cmd_command_line([r#"say "hi""#]), r#""say ""hi""""#);
        assert_eq!(cmd_command_line(["a&b"]), r#""a&b""#);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_captures_stdout() {
        let runner = ShellRunner::new(Logger::new("test"));
        let output = runner.run("echo hello").unwrap();
        assert_eq!(output.stdout, "hello");
        assert_eq!(output.exit_code, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_reports_exit_code() {
        let runner = ShellRunner::new(Logger::new("test"));
        let err = runner.run("echo oops >&2; exit 3").unwrap_err();
        assert_eq!(err.output.exit_code, 3);
        assert_eq!(err.output.stderr, "oops");
    }

    #[test]
    fn test_dry_run_does_not_execute() {
        let runner = ShellRunner::dry_run(Logger::new("test"));
        let output = runner.run("exit 1").unwrap();
        assert_eq!(output, CommandOutput::default());
    }
}
