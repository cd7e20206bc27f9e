//! A session against a single devpi index.

use crate::{
    command::{self, DevpiCommand, Executor, Outcome},
    validate,
    wheel::{Compatibility, Tag, TagSet, WheelFile},
    Config, Error, Result,
};
use std::path::Path;
use tempfile::TempDir;
use tracing::{debug, info};

/// A devpi client session.
///
/// Each session has its own client directory, so that several sessions can
/// be used at the same time without sharing login state. The directory is
/// removed when the `Client` is dropped, or when [`Client::close`] is called.
pub struct Client {
    config: Config,
    executor: Box<dyn Executor + Send>,
    compatibility: Box<dyn Compatibility + Send>,
    client_dir: TempDir,
}

/// A builder for opening a new [`Client`] session
#[must_use]
pub struct Builder {
    config: Config,
    executor: Option<Box<dyn Executor + Send>>,
    compatibility: Option<Box<dyn Compatibility + Send>>,
}

impl Builder {
    /// Log in with the given username and password when the session starts
    pub fn credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.config = self.config.with_credentials(username, password);
        self
    }

    /// Set the name or path of the devpi executable.
    ///
    /// Has no effect if a custom [`Executor`] is set.
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.config = self.config.with_program(program);
        self
    }

    /// Set the python interpreter used to determine which wheels are
    /// compatible.
    ///
    /// Has no effect if a custom [`Compatibility`] oracle is set.
    pub fn python(mut self, python: impl Into<String>) -> Self {
        self.config = self.config.with_python(python);
        self
    }

    /// Run devpi commands through a custom [`Executor`]
    pub fn executor(mut self, executor: impl Executor + Send + 'static) -> Self {
        self.executor = Some(Box::new(executor));
        self
    }

    /// Decide wheel compatibility with a custom oracle, instead of asking
    /// the python interpreter
    pub fn compatibility(mut self, compatibility: impl Compatibility + Send + 'static) -> Self {
        self.compatibility = Some(Box::new(compatibility));
        self
    }

    /// Start the session.
    ///
    /// This creates the client directory, selects the index, and logs in if
    /// credentials were given.
    ///
    /// # Errors
    ///
    /// This method fails if the supported tags can't be determined, the
    /// client directory can't be created, or devpi fails to select the index
    /// or log in. The client directory is removed again on failure.
    pub fn open(self) -> Result<Client> {
        let compatibility: Box<dyn Compatibility + Send> = match self.compatibility {
            Some(compatibility) => compatibility,
            None => Box::new(TagSet::detect(self.config.python())?),
        };

        let executor: Box<dyn Executor + Send> = match self.executor {
            Some(executor) => executor,
            None => Box::new(DevpiCommand::new(self.config.program())),
        };

        let client_dir = tempfile::Builder::new().prefix("devpi-client").tempdir()?;

        let client = Client {
            config: self.config,
            executor,
            compatibility,
            client_dir,
        };

        debug!(
            index = client.index_url(),
            client_dir = %client.client_dir().display(),
            "starting devpi session"
        );

        client.check("use", &[client.index_url()])?;

        if let Some((username, password)) = client.config.login() {
            client.check("login", &[username, "--password", password])?;
            info!(index = client.index_url(), username, "logged in");
        }

        Ok(client)
    }
}

impl From<Config> for Builder {
    fn from(config: Config) -> Self {
        Self {
            config,
            executor: None,
            compatibility: None,
        }
    }
}

impl Client {
    /// Prepare a new session against the given index.
    ///
    /// Additional options can be set using the builder API (see [`Builder`]
    /// for options).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use devpi_client::Client;
    /// # use devpi_client::Error;
    ///
    /// let client = Client::builder("https://devpi.example.com/user/dev")
    ///     .credentials("user", "secret")
    ///     .python("/usr/bin/python3.8")
    ///     .open()?;
    ///
    /// client.upload("dist/mypkg-1.0.0-py3-none-any.whl")?;
    /// # Ok::<(), Error>(())
    /// ```
    pub fn builder(index: impl Into<String>) -> Builder {
        Builder::from(Config::new(index))
    }

    /// Start a session using the settings in a [`Config`]
    ///
    /// # Errors
    ///
    /// See [`Builder::open`].
    pub fn from_config(config: Config) -> Result<Self> {
        Builder::from(config).open()
    }

    /// Check whether a compatible build of the given package version is in
    /// the index.
    ///
    /// Only wheels count. A wheel is compatible if it can be installed in the
    /// environment described by the [`Compatibility`] oracle. Anything else
    /// in the listing, such as source distributions, is ignored.
    ///
    /// # Errors
    ///
    /// This method fails if the package name is empty, or if devpi fails for
    /// any reason other than the package not being found.
    pub fn package_version_exists(&self, package: &str, version: &str) -> Result<bool> {
        validate::package_name(package)?;

        let query = format!("{}=={}", package, version);
        let args = [query.as_str()];
        let outcome = self.execute("list", &args)?;

        if !outcome.is_success() {
            if outcome.is_not_found() {
                debug!(package, version, "package not found in index");
                return Ok(false);
            }
            return Err(self.failure("list", &args, outcome));
        }

        let found: Vec<&str> = outcome
            .output()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let supported: Vec<String> = self
            .supported_tags()
            .iter()
            .map(ToString::to_string)
            .collect();
        info!(package, version, ?found, ?supported, "looking for package version");

        let exists = found
            .iter()
            .filter_map(|item| WheelFile::parse(item).ok())
            .any(|wheel| self.compatibility.is_compatible(&wheel));

        Ok(exists)
    }

    /// Upload the given file to the index
    ///
    /// # Errors
    ///
    /// This method fails if devpi fails to upload the file.
    pub fn upload(&self, file: impl AsRef<Path>) -> Result<()> {
        let file = file.as_ref().to_string_lossy().into_owned();
        self.check("upload", &[file.as_str()])?;
        info!(index = self.index_url(), file = %file, "uploaded file");
        Ok(())
    }

    /// Upload every artifact in the given directory to the index
    ///
    /// # Errors
    ///
    /// This method fails if devpi fails to upload the directory.
    pub fn upload_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref().to_string_lossy().into_owned();
        self.check("upload", &["--from-dir", dir.as_str()])?;
        info!(index = self.index_url(), dir = %dir, "uploaded directory");
        Ok(())
    }

    /// The Url of the index this session is bound to
    #[must_use]
    pub fn index_url(&self) -> &str {
        self.config.index()
    }

    /// The client directory of this session
    #[must_use]
    pub fn client_dir(&self) -> &Path {
        self.client_dir.path()
    }

    /// The tags supported by the environment, most specific first
    #[must_use]
    pub fn supported_tags(&self) -> &[Tag] {
        self.compatibility.supported()
    }

    /// End the session, removing the client directory.
    ///
    /// Dropping the `Client` does the same, but ignores errors.
    ///
    /// # Errors
    ///
    /// This method fails if the client directory cannot be removed.
    pub fn close(self) -> Result<()> {
        debug!(index = self.index_url(), "closing devpi session");
        self.client_dir.close()?;
        Ok(())
    }

    fn execute(&self, subcommand: &str, args: &[&str]) -> Result<Outcome> {
        let outcome = self
            .executor
            .execute(subcommand, args, self.client_dir.path())?;

        debug!(
            subcommand,
            code = ?outcome.code(),
            success = outcome.is_success(),
            "devpi command finished"
        );

        Ok(outcome)
    }

    /// Run a command, treating any unsuccessful exit as an error
    fn check(&self, subcommand: &str, args: &[&str]) -> Result<Outcome> {
        let outcome = self.execute(subcommand, args)?;

        if outcome.is_success() {
            Ok(outcome)
        } else {
            Err(self.failure(subcommand, args, outcome))
        }
    }

    fn failure(&self, subcommand: &str, args: &[&str], outcome: Outcome) -> Error {
        Error::Command {
            command: command::display(self.config.program(), subcommand, args),
            code: outcome.code(),
            output: outcome.into_output(),
        }
    }
}
