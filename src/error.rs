use crate::validate;
use std::io;

/// The error type for all operations of this crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input was rejected before anything was run
    #[error("Validation Error")]
    Validation(#[from] validate::Error),

    /// The external program could not be run, or the session directory could
    /// not be managed
    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    /// The external program exited unsuccessfully
    #[error("`{command}` failed (exit code: {code:?}): {output}")]
    Command {
        /// The command line that was run, with secrets removed
        command: String,

        /// The exit code, if the process was not killed by a signal
        code: Option<i32>,

        /// Combined stdout and stderr
        output: String,
    },

    /// A config file could not be parsed
    #[error("Config Error: {0}")]
    Config(#[from] serde_json::Error),

    /// The python interpreter returned output that could not be understood
    #[error("couldn't determine the supported tags of the environment: {0}")]
    Environment(String),
}

/// A specialised `Result` type for this crate
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::Error;
    use std::io;

    #[test]
    fn io_error_keeps_cause() {
        let error = Error::from(io::Error::new(io::ErrorKind::NotFound, "devpi: not found"));

        assert_eq!(error.to_string(), "IO Error: devpi: not found");
    }

    #[test]
    fn config_error_keeps_cause() {
        let error = Error::from(serde_json::from_str::<serde_json::Value>("{").unwrap_err());

        assert!(error.to_string().starts_with("Config Error: EOF"));
    }
}
