use crate::{Error, Result};
use std::{fmt, process::Command, str::FromStr};
use tracing::debug;

/// Prints the implementation, version, platform and ABI of the interpreter,
/// one per line.
const PROBE: &str = r#"
import platform, sys, sysconfig
impl = {"CPython": "cp", "PyPy": "pp", "IronPython": "ip", "Jython": "jy"}
print(impl.get(platform.python_implementation(), "cp"))
print(sys.version_info[0])
print(sys.version_info[1])
print(sysconfig.get_platform().replace("-", "_").replace(".", "_"))
soabi = sysconfig.get_config_var("SOABI") or ""
parts = soabi.split("-")
print("cp" + parts[1] if soabi.startswith("cpython-") and len(parts) > 1 else "")
"#;

/// A single compatibility tag, such as `py3-none-any`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    python: String,
    abi: String,
    platform: String,
}

impl Tag {
    /// Create a new [`Tag`]
    pub fn new(
        python: impl Into<String>,
        abi: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            python: python.into(),
            abi: abi.into(),
            platform: platform.into(),
        }
    }

    /// The python tag, e.g. `py3` or `cp38`
    #[must_use]
    pub fn python(&self) -> &str {
        &self.python
    }

    /// The ABI tag, e.g. `none` or `abi3`
    #[must_use]
    pub fn abi(&self) -> &str {
        &self.abi
    }

    /// The platform tag, e.g. `any` or `linux_x86_64`
    #[must_use]
    pub fn platform(&self) -> &str {
        &self.platform
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}-{}", self.python, self.abi, self.platform)
    }
}

/// The error returned when parsing a malformed [`Tag`]
#[derive(thiserror::Error, Debug, PartialEq)]
#[error("invalid tag: {0}")]
pub struct InvalidTag(String);

impl FromStr for Tag {
    type Err = InvalidTag;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('-').collect();
        match parts.as_slice() {
            [python, abi, platform] if parts.iter().all(|part| !part.is_empty()) => {
                Ok(Self::new(*python, *abi, *platform))
            }
            _ => Err(InvalidTag(s.to_string())),
        }
    }
}

/// A description of a python interpreter, from which its supported tags are
/// derived
#[derive(Debug, Clone, PartialEq)]
pub struct Interpreter {
    implementation: String,
    major: u32,
    minor: u32,
    platform: String,
    abi: Option<String>,
}

impl Interpreter {
    /// Create a new [`Interpreter`].
    ///
    /// `implementation` is the short implementation name (`cp` for CPython,
    /// `pp` for PyPy). CPython interpreters get the `cpXY` ABI tag by
    /// default, other implementations have none. Use [`Interpreter::with_abi`]
    /// to override this.
    pub fn new(
        implementation: impl Into<String>,
        major: u32,
        minor: u32,
        platform: impl Into<String>,
    ) -> Self {
        let implementation = implementation.into();
        let abi = if implementation == "cp" {
            Some(format!("cp{}{}", major, minor))
        } else {
            None
        };

        Self {
            implementation,
            major,
            minor,
            platform: platform.into(),
            abi,
        }
    }

    /// Set the ABI tag of the interpreter
    #[must_use]
    pub fn with_abi(mut self, abi: Option<String>) -> Self {
        self.abi = abi;
        self
    }

    /// Ask a python interpreter to describe itself.
    ///
    /// # Errors
    ///
    /// This method fails if the interpreter cannot be run, exits
    /// unsuccessfully, or prints something unexpected.
    pub fn detect(python: &str) -> Result<Self> {
        let output = Command::new(python).arg("-c").arg(PROBE).output()?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));

            return Err(Error::Command {
                command: format!("{} -c <probe>", python),
                code: output.status.code(),
                output: combined,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let interpreter = Self::from_probe(&stdout)?;

        debug!(python, ?interpreter, "detected python interpreter");

        Ok(interpreter)
    }

    fn from_probe(output: &str) -> Result<Self> {
        let invalid = || Error::Environment(output.to_string());

        let mut lines = output.lines().map(str::trim);

        let implementation = lines.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let major = lines
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(invalid)?;
        let minor = lines
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(invalid)?;
        let platform = lines.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let abi = lines.next().filter(|s| !s.is_empty());

        // an empty ABI line keeps the default from `new`
        let mut interpreter = Self::new(implementation, major, minor, platform);
        if let Some(abi) = abi {
            interpreter = interpreter.with_abi(Some(abi.to_string()));
        }

        Ok(interpreter)
    }
}

/// The ordered set of tags supported by an environment, most specific first
#[derive(Debug, Clone, PartialEq)]
pub struct TagSet {
    tags: Vec<Tag>,
}

impl TagSet {
    /// Create a [`TagSet`] from an explicit list of tags
    pub fn from_tags(tags: impl IntoIterator<Item = Tag>) -> Self {
        Self {
            tags: tags.into_iter().collect(),
        }
    }

    /// The tags supported by the given interpreter.
    ///
    /// In order of preference:
    /// - the current version, built for this ABI, the stable ABI, or no ABI,
    ///   on this platform
    /// - this implementation, for this or any older minor version, without
    ///   platform requirements
    /// - any python of this major version, on this platform
    /// - generic python, for this or any older minor version
    #[must_use]
    pub fn for_interpreter(interpreter: &Interpreter) -> Self {
        let Interpreter {
            implementation,
            major,
            minor,
            platform,
            abi,
        } = interpreter;

        let versions: Vec<String> = (0..=*minor)
            .rev()
            .map(|minor| format!("{}{}", major, minor))
            .collect();
        let current = &versions[0];

        let mut abis: Vec<&str> = abi.iter().map(String::as_str).collect();
        if implementation == "cp" && *major == 3 {
            abis.push("abi3");
        }
        abis.push("none");

        let mut tags = Vec::new();

        for abi in abis {
            tags.push(Tag::new(
                format!("{}{}", implementation, current),
                abi,
                platform.as_str(),
            ));
        }

        for (i, version) in versions.iter().enumerate() {
            tags.push(Tag::new(
                format!("{}{}", implementation, version),
                "none",
                "any",
            ));
            if i == 0 {
                tags.push(Tag::new(
                    format!("{}{}", implementation, major),
                    "none",
                    "any",
                ));
            }
        }

        tags.push(Tag::new(format!("py{}", major), "none", platform.as_str()));

        for (i, version) in versions.iter().enumerate() {
            tags.push(Tag::new(format!("py{}", version), "none", "any"));
            if i == 0 {
                tags.push(Tag::new(format!("py{}", major), "none", "any"));
            }
        }

        Self { tags }
    }

    /// The tags supported by the given python interpreter
    ///
    /// # Errors
    ///
    /// See [`Interpreter::detect`].
    pub fn detect(python: &str) -> Result<Self> {
        Ok(Self::for_interpreter(&Interpreter::detect(python)?))
    }

    /// The supported tags, most specific first
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tags: Vec<String> = self.tags.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", tags.join(", "))
    }
}
