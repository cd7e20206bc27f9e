//! Running the external devpi client.
//!
//! Every index operation is a single invocation of the external program.
//! The [`Executor`] trait is the seam between the [`Client`](crate::Client)
//! and the process; [`DevpiCommand`] is the implementation that actually
//! spawns `devpi`.

use std::{io, path::Path, process::Command};

/// The result of running one external command.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    success: bool,
    code: Option<i32>,
    output: String,
}

impl Outcome {
    /// Create a new [`Outcome`]
    pub fn new(success: bool, code: Option<i32>, output: impl Into<String>) -> Self {
        Self {
            success,
            code,
            output: output.into(),
        }
    }

    /// A command which exited with code 0
    pub fn success(output: impl Into<String>) -> Self {
        Self::new(true, Some(0), output)
    }

    /// A command which exited with the given nonzero code
    pub fn failure(code: i32, output: impl Into<String>) -> Self {
        Self::new(false, Some(code), output)
    }

    /// Whether the command exited successfully
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The exit code, if the process was not killed by a signal
    #[must_use]
    pub fn code(&self) -> Option<i32> {
        self.code
    }

    /// Combined stdout and stderr of the command
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Consume the [`Outcome`], returning the combined output
    #[must_use]
    pub fn into_output(self) -> String {
        self.output
    }

    /// Whether the command failed because the index answered with a 404.
    ///
    /// devpi doesn't report this through its exit code, so this is a
    /// substring match on the output. A package or file name containing
    /// "404" in the output of a failed command will also match.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        !self.success && self.output.contains("404")
    }
}

/// Something which can run a devpi subcommand.
///
/// Implementations must direct the command at `client_dir`, so that
/// concurrent sessions do not share state.
pub trait Executor {
    /// Run `subcommand` with the given arguments and wait for it to exit.
    ///
    /// # Errors
    ///
    /// An error is returned only if the command could not be run at all. A
    /// command which runs and fails is reported through the [`Outcome`].
    fn execute(&self, subcommand: &str, args: &[&str], client_dir: &Path) -> io::Result<Outcome>;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn execute(&self, subcommand: &str, args: &[&str], client_dir: &Path) -> io::Result<Outcome> {
        (**self).execute(subcommand, args, client_dir)
    }
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    fn execute(&self, subcommand: &str, args: &[&str], client_dir: &Path) -> io::Result<Outcome> {
        (**self).execute(subcommand, args, client_dir)
    }
}

/// Runs the devpi executable as a child process.
///
/// The command line is `<program> <subcommand> [args...] --clientdir=<dir>`.
#[derive(Debug, Clone)]
pub struct DevpiCommand {
    program: String,
}

impl DevpiCommand {
    /// Create a new [`DevpiCommand`] using the given executable name or path
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The executable name or path
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for DevpiCommand {
    fn default() -> Self {
        Self::new("devpi")
    }
}

impl Executor for DevpiCommand {
    fn execute(&self, subcommand: &str, args: &[&str], client_dir: &Path) -> io::Result<Outcome> {
        let output = Command::new(&self.program)
            .arg(subcommand)
            .args(args)
            .arg(format!("--clientdir={}", client_dir.display()))
            .output()?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(Outcome::new(
            output.status.success(),
            output.status.code(),
            combined,
        ))
    }
}

/// Render a command line for error messages and logs, hiding passwords.
pub(crate) fn display(program: &str, subcommand: &str, args: &[&str]) -> String {
    let mut words = vec![program, subcommand];
    let mut hide_next = false;

    for arg in args {
        words.push(if hide_next { "****" } else { *arg });
        hide_next = *arg == "--password";
    }

    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::Outcome;
    use test_case::test_case;

    #[test_case(Outcome::failure(1, "404 Not Found") => true ; "when a failed command reports 404")]
    #[test_case(Outcome::failure(1, "GET https://devpi/user/dev/+simple/mypkg\n404 Not Found: no such project") => true ; "when 404 is inside a longer message")]
    #[test_case(Outcome::failure(1, "500 Internal Server Error") => false ; "when a failed command reports another status")]
    #[test_case(Outcome::success("mypkg-404.0-py3-none-any.whl") => false ; "when the command succeeded")]
    #[test_case(Outcome::failure(1, "no such package: mypkg404") => true ; "when a name contains 404")]
    fn is_not_found(outcome: Outcome) -> bool {
        outcome.is_not_found()
    }

    #[test_case("use", &["https://devpi/user/dev"] => "devpi use https://devpi/user/dev" ; "when there are no secrets")]
    #[test_case("login", &["user", "--password", "secret"] => "devpi login user --password ****" ; "when there is a password")]
    #[test_case("upload", &["--from-dir", "dist"] => "devpi upload --from-dir dist" ; "when there are flags")]
    fn display(subcommand: &str, args: &[&str]) -> String {
        crate::command::display("devpi", subcommand, args)
    }

    #[cfg(unix)]
    mod process {
        use super::super::{DevpiCommand, Executor};
        use std::{fs, os::unix::fs::PermissionsExt, path::Path};

        fn fake_devpi(dir: &Path, body: &str) -> String {
            let path = dir.join("devpi");
            fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path.to_str().unwrap().to_string()
        }

        #[test]
        fn arguments_and_combined_output() {
            let bin_dir = tempfile::tempdir().unwrap();
            let client_dir = tempfile::tempdir().unwrap();
            let program = fake_devpi(bin_dir.path(), "echo \"args: $*\"\necho oops >&2\nexit 3");

            let outcome = DevpiCommand::new(program)
                .execute("upload", &["--from-dir", "dist"], client_dir.path())
                .unwrap();

            let expected_args = format!(
                "args: upload --from-dir dist --clientdir={}",
                client_dir.path().display()
            );

            assert!(!outcome.is_success());
            assert_eq!(outcome.code(), Some(3));
            assert!(outcome.output().contains(&expected_args));
            assert!(outcome.output().contains("oops"));
        }

        #[test]
        fn success() {
            let bin_dir = tempfile::tempdir().unwrap();
            let client_dir = tempfile::tempdir().unwrap();
            let program = fake_devpi(bin_dir.path(), "echo mypkg-1.0.0-py3-none-any.whl");

            let outcome = DevpiCommand::new(program)
                .execute("list", &["mypkg==1.0.0"], client_dir.path())
                .unwrap();

            assert!(outcome.is_success());
            assert_eq!(outcome.output(), "mypkg-1.0.0-py3-none-any.whl\n");
        }

        #[test]
        fn missing_program() {
            let client_dir = tempfile::tempdir().unwrap();

            let result = DevpiCommand::new("/nonexistent/devpi").execute(
                "use",
                &["https://devpi/user/dev"],
                client_dir.path(),
            );

            assert!(result.is_err());
        }
    }
}
