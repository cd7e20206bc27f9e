use super::Tag;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHEEL_INFO: Regex = Regex::new(
        r"^(?P<namever>(?P<name>.+?)(-(?P<ver>\d.+?))?)(-(?P<build>\d.*?))?-(?P<pyver>[^-]+?)-(?P<abi>[^-]+?)-(?P<plat>[^-]+?)\.whl$"
    )
    .unwrap();
}

/// The error returned when a filename is not a valid wheel filename
#[derive(thiserror::Error, Debug, PartialEq)]
#[error("bad wheel filename: {filename}")]
pub struct BadWheelFile {
    filename: String,
}

/// A wheel, as described by its filename.
///
/// *[See the wheel filename convention](https://peps.python.org/pep-0427/#file-name-convention)*
#[derive(Debug, Clone, PartialEq)]
pub struct WheelFile {
    name: String,
    version: Option<String>,
    build: Option<String>,
    python_tags: Vec<String>,
    abi_tags: Vec<String>,
    platform_tags: Vec<String>,
}

impl WheelFile {
    /// Parse a wheel filename.
    ///
    /// Paths and URLs are accepted, only the part after the last `/` is
    /// considered.
    ///
    /// # Errors
    ///
    /// Returns [`BadWheelFile`] if the name doesn't follow the wheel filename
    /// convention.
    ///
    /// # Example
    /// ```
    /// use devpi_client::wheel::WheelFile;
    ///
    /// let wheel = WheelFile::parse("mypkg-1.0.0-py2.py3-none-any.whl").unwrap();
    ///
    /// assert_eq!(wheel.name(), "mypkg");
    /// assert_eq!(wheel.tags().count(), 2);
    /// ```
    pub fn parse(filename: &str) -> Result<Self, BadWheelFile> {
        let basename = filename.rsplit('/').next().unwrap_or(filename);

        let captures = WHEEL_INFO.captures(basename).ok_or_else(|| BadWheelFile {
            filename: filename.to_string(),
        })?;

        let text = |group: &str| captures.name(group).map(|m| m.as_str().to_string());
        let split = |group: &str| {
            captures
                .name(group)
                .map(|m| m.as_str().split('.').map(ToString::to_string).collect::<Vec<_>>())
                .unwrap_or_default()
        };

        Ok(Self {
            name: text("name").unwrap_or_default(),
            version: text("ver"),
            build: text("build"),
            python_tags: split("pyver"),
            abi_tags: split("abi"),
            platform_tags: split("plat"),
        })
    }

    /// The distribution name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The distribution version
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The optional build tag
    #[must_use]
    pub fn build(&self) -> Option<&str> {
        self.build.as_deref()
    }

    /// Every tag this wheel declares support for.
    ///
    /// Compressed tag sets such as `py2.py3` are expanded.
    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.python_tags.iter().flat_map(move |python| {
            self.abi_tags.iter().flat_map(move |abi| {
                self.platform_tags
                    .iter()
                    .map(move |platform| Tag::new(python, abi, platform))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Tag, WheelFile};
    use test_case::test_case;

    #[test]
    fn parse() {
        let wheel = WheelFile::parse("my_pkg-1.0.0-1-cp38-cp38-manylinux1_x86_64.whl").unwrap();

        assert_eq!(wheel.name(), "my_pkg");
        assert_eq!(wheel.version(), Some("1.0.0"));
        assert_eq!(wheel.build(), Some("1"));
        assert_eq!(
            wheel.tags().collect::<Vec<_>>(),
            vec![Tag::new("cp38", "cp38", "manylinux1_x86_64")]
        );
    }

    #[test]
    fn compressed_tags() {
        let wheel = WheelFile::parse("mypkg-1.0-py2.py3-none-any.whl").unwrap();

        assert_eq!(wheel.build(), None);
        assert_eq!(
            wheel.tags().collect::<Vec<_>>(),
            vec![
                Tag::new("py2", "none", "any"),
                Tag::new("py3", "none", "any"),
            ]
        );
    }

    #[test]
    fn hyphenated_name() {
        let wheel = WheelFile::parse("my-pkg-1.0.0-py3-none-any.whl").unwrap();

        assert_eq!(wheel.name(), "my-pkg");
        assert_eq!(wheel.version(), Some("1.0.0"));
    }

    #[test]
    fn download_url() {
        let wheel = WheelFile::parse(
            "https://devpi.example.com/user/dev/+f/1a2/b3c4d5e6f7a8b/mypkg-1.0.0-py3-none-any.whl",
        )
        .unwrap();

        assert_eq!(wheel.name(), "mypkg");
        assert_eq!(wheel.version(), Some("1.0.0"));
    }

    #[test_case("mypkg-1.0.0-py3-none-any.whl" ; "when well formed")]
    #[test_case("mypkg-1.0.0.tar.gz" => panics "bad wheel" ; "when source distribution")]
    #[test_case("mypkg-1.0.0.zip" => panics "bad wheel" ; "when zip archive")]
    #[test_case("mypkg-1.0.0-py3-none-any.egg" => panics "bad wheel" ; "when egg")]
    #[test_case("" => panics "bad wheel" ; "when empty")]
    #[test_case("mypkg-py3.whl" => panics "bad wheel" ; "when tags are missing")]
    fn validity(filename: &str) {
        WheelFile::parse(filename).expect("bad wheel");
    }
}
