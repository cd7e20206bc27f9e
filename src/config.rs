use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::Path};

const DEFAULT_PROGRAM: &str = "devpi";
const DEFAULT_PYTHON: &str = "python3";

fn default_program() -> String {
    DEFAULT_PROGRAM.to_string()
}

fn default_python() -> String {
    DEFAULT_PYTHON.to_string()
}

/// The settings for one [`Client`](crate::Client) session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    index: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    password: Option<String>,

    #[serde(default = "default_program")]
    program: String,

    #[serde(default = "default_python")]
    python: String,
}

impl Config {
    /// Create a new [`Config`]
    ///
    /// only the index Url is required. optional values can be set using the
    /// builder methods.
    ///
    /// # Example
    /// ```
    /// use devpi_client::Config;
    ///
    /// let config = Config::new("https://devpi.example.com/user/dev")
    ///     // Log in when the session starts
    ///     .with_credentials("user", "secret")
    ///     // Use a devpi binary that isn't on the PATH
    ///     .with_program("/opt/devpi/bin/devpi")
    ///     // Match wheels against a specific interpreter
    ///     .with_python("/usr/bin/python3.8");
    /// ```
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            username: None,
            password: None,
            program: default_program(),
            python: default_python(),
        }
    }

    /// Set the username and password used to log in to the index
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the name or path of the devpi executable
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the python interpreter whose supported tags decide which wheels
    /// count as compatible
    #[must_use]
    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = python.into();
        self
    }

    /// The Url of the index
    #[must_use]
    pub fn index(&self) -> &str {
        &self.index
    }

    /// The username used to log in, if any
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// The password used to log in, if any
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// The name or path of the devpi executable
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The python interpreter used to determine the supported tags
    #[must_use]
    pub fn python(&self) -> &str {
        &self.python
    }

    /// The credentials to log in with.
    ///
    /// A login only happens with a non-empty username and a password. The
    /// password itself may be empty.
    pub(crate) fn login(&self) -> Option<(&str, &str)> {
        match (self.username(), self.password()) {
            (Some(username), Some(password)) if !username.is_empty() => Some((username, password)),
            _ => None,
        }
    }

    /// Write the config to a file as JSON
    ///
    /// # Errors
    ///
    /// This method fails if the file cannot be written.
    pub fn to_file(&self, path: impl AsRef<Path>) -> crate::Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Read a config from a JSON file
    ///
    /// # Errors
    ///
    /// This method fails if the file cannot be read, or does not contain a
    /// valid config.
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let bytes = fs::read(path)?;
        let config = serde_json::from_slice(&bytes)?;

        Ok(config)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let json = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
        write!(f, "{}", json)
    }
}
