//! Deciding whether a built wheel can be installed in the current
//! environment.
//!
//! A wheel's filename declares the python versions, ABIs and platforms it
//! supports. The wheel is compatible if any one of those tags is supported
//! by the environment (see [`TagSet`]).

mod file;
pub use file::{BadWheelFile, WheelFile};

mod tags;
pub use tags::{Interpreter, InvalidTag, Tag, TagSet};

/// An oracle which decides whether a wheel matches the running environment
pub trait Compatibility {
    /// The tags supported by the environment, most specific first
    fn supported(&self) -> &[Tag];

    /// Whether any of the wheel's tags is supported
    fn is_compatible(&self, wheel: &WheelFile) -> bool {
        let supported = self.supported();
        wheel.tags().any(|tag| supported.contains(&tag))
    }
}

impl Compatibility for TagSet {
    fn supported(&self) -> &[Tag] {
        self.tags()
    }
}

impl<C: Compatibility + ?Sized> Compatibility for &C {
    fn supported(&self) -> &[Tag] {
        (**self).supported()
    }

    fn is_compatible(&self, wheel: &WheelFile) -> bool {
        (**self).is_compatible(wheel)
    }
}

#[cfg(test)]
mod tests {
    use super::{Compatibility, Interpreter, TagSet, WheelFile};
    use test_case::test_case;

    fn cpython38() -> TagSet {
        TagSet::for_interpreter(&Interpreter::new("cp", 3, 8, "linux_x86_64"))
    }

    #[test_case("mypkg-1.0.0-py3-none-any.whl" => true ; "when pure python 3")]
    #[test_case("mypkg-1.0.0-py2-none-any.whl" => false ; "when pure python 2")]
    #[test_case("mypkg-1.0.0-py2.py3-none-any.whl" => true ; "when universal")]
    #[test_case("mypkg-1.0.0-cp38-cp38-linux_x86_64.whl" => true ; "when built for this interpreter")]
    #[test_case("mypkg-1.0.0-cp38-cp38-win_amd64.whl" => false ; "when built for another platform")]
    #[test_case("mypkg-1.0.0-cp39-cp39-linux_x86_64.whl" => false ; "when built for a newer interpreter")]
    #[test_case("mypkg-1.0.0-cp38-abi3-linux_x86_64.whl" => true ; "when built against the stable abi")]
    #[test_case("mypkg-1.0.0-cp35-none-any.whl" => true ; "when built for an older minor version")]
    #[test_case("mypkg-1.0.0-py3-none-linux_x86_64.whl" => true ; "when platform specific without abi")]
    fn is_compatible(filename: &str) -> bool {
        let wheel = WheelFile::parse(filename).unwrap();
        cpython38().is_compatible(&wheel)
    }

    #[test]
    fn explicit_tag_set() {
        let tags = TagSet::from_tags(vec!["py3-none-any".parse().unwrap()]);
        let wheel = WheelFile::parse("mypkg-1.0.0-py2.py3-none-any.whl").unwrap();

        assert!(tags.is_compatible(&wheel));
        assert!((&tags).is_compatible(&wheel));
    }
}
