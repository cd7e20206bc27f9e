#![deny(clippy::all)]
#![warn(clippy::pedantic, missing_docs)]

//! A thin wrapper around the `devpi` command line client.
//!
//! Each [`Client`] is a short-lived session against a single package index.
//! It can check whether a compatible build of a package version already
//! exists, and upload built artifacts.
//!
//! ```no_run
//! use devpi_client::Client;
//! # use devpi_client::Error;
//!
//! let client = Client::builder("https://devpi.example.com/user/dev")
//!     .credentials("user", "secret")
//!     .open()?;
//!
//! if !client.package_version_exists("mypkg", "1.0.0")? {
//!     client.upload_dir("dist")?;
//! }
//! # Ok::<(), Error>(())
//! ```

mod error;
pub use error::{Error, Result};

mod config;
pub use config::Config;

pub mod client;
pub use client::Client;

pub mod command;

pub mod wheel;

pub mod validate;
