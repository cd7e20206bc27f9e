//! Checks applied to caller input before any command is run.

/// The error returned when input fails validation
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    /// A package name was empty, or all whitespace
    #[error("package name must not be empty")]
    EmptyPackageName,
}

/// Check that a package name is usable in a `list` query.
///
/// # Errors
///
/// Returns [`Error::EmptyPackageName`] if the name is empty after trimming.
pub fn package_name(name: &str) -> Result<(), Error> {
    if name.trim().is_empty() {
        Err(Error::EmptyPackageName)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    #[test_case("mypkg" ; "when name is plain")]
    #[test_case("my-pkg.sub_name" ; "when name has punctuation")]
    #[test_case("" => panics "invalid" ; "when name is empty")]
    #[test_case("  \t" => panics "invalid" ; "when name is whitespace")]
    fn package_name(name: &str) {
        crate::validate::package_name(name).expect("invalid");
    }
}
