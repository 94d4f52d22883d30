//! Turns e-paper newspaper issues into self-contained EPUB archives.
//!
//! The issue is fetched page by page through a [`Fetcher`]. Each page's
//! reading order is rebuilt from the articles' previous/next links, untitled
//! articles get a derived title, and article bodies are cleaned up. Everything
//! is written to a [`Sink`] together with a consistent manifest, spine and
//! navigation tree.
//!
//! ```rust,no_run
//! use epaper_core::{Converter, EpaperClient, EpaperConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EpaperConfig::default();
//! let client = EpaperClient::new(config.clone())?;
//! let site = client.site_info().await?;
//! let edition = site.catalog.resolve("az-d")?;
//! let session = client.login(&edition).await?;
//!
//! let converter = Converter::new(session, config, site.imprint);
//! let (path, report) = converter.convert_to_file("latest", std::path::Path::new(".")).await?;
//! println!("{} ({} articles)", path.display(), report.articles_linked);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod catalog;
pub mod config;
pub mod convert;
pub mod date;
pub mod error;
pub mod fetch;
pub mod model;
pub mod package;
pub mod reading_order;
pub mod render;
pub mod sanitize;
pub mod title;

pub use archive::{MemorySink, Sink, ZipSink};
pub use catalog::{Edition, EditionCatalog, SiteInfo};
pub use config::{Credentials, EpaperConfig, EpaperConfigBuilder};
pub use convert::{ConversionReport, Converter, output_file_name};
pub use date::IssueDate;
pub use error::{EpaperError, Result};
pub use fetch::Fetcher;
#[cfg(feature = "fetch")]
pub use fetch::{EpaperClient, Session};
pub use model::{Article, ArticleRegistry, Element, Issue, Link, Page, Picture};
pub use package::{ManifestItem, NavPoint, Package, PackageAssembler, PlayOrder};
pub use reading_order::{Sequence, resolve};
pub use sanitize::{excerpt, sanitize};
pub use title::derive_title;
