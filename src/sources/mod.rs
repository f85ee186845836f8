//! Remote artifacts.
//!
//! Everything py2win pulls from the network (the embeddable runtime, the
//! source tarball, `get-pip.py`, the launcher manifest) is fetched through a
//! [`Downloader`] and unpacked with the [`archive`] helpers.

pub mod archive;
pub mod download;
pub mod urls;

pub use archive::ExtractOptions;
pub use download::{Downloader, Fetch, HttpFetcher};
