//! mrsgen - hosts blocklist to mihomo rule-set generation toolchain.
//!
//! This crate automates two sequential pipelines around the `mihomo`
//! converter binary:
//!
//! - **List acquisition**: download hosts-format ad-block lists, extract
//!   the blocked domains, and emit a Clash rule-provider document of
//!   `DOMAIN-SUFFIX` rules (unique, sorted, with a generation header).
//! - **Format compilation**: find rule-list documents on disk, make sure a
//!   usable converter binary is cached locally (downloading the release
//!   asset for the host platform when it isn't), and run the converter once
//!   per document to produce the binary `.mrs` rule-set format.
//!
//! The compiled format itself is opaque to this crate; all of its semantics
//! live in the external tool.
//!
//! # Quick Start
//!
//! ```ignore
//! use mrsgen::{BatchCompiler, BlocklistFetcher, Config, ToolManager};
//!
//! let config = Config::default();
//!
//! // Pipeline A: hosts lists -> rule-list document
//! let fetcher = BlocklistFetcher::new()?;
//! let count = fetcher.generate(&config.sources, &config.blocklist_output)?;
//! println!("{} unique rules", count);
//!
//! // Pipeline B: rule-list documents -> compiled rule-sets
//! let manager = ToolManager::new(&config.tool_path, &config.release_url);
//! manager.ensure()?;
//!
//! let compiler = BatchCompiler::new(&config.tool_path, &config.rules_dir, &config.output_dir);
//! let report = compiler.run()?;
//! println!("{}/{} converted", report.succeeded, report.total());
//! ```
//!
//! Both pipelines are fully sequential and blocking. A failing fetch or an
//! unacquirable converter aborts its pipeline; a single failing conversion
//! is logged and counted while the batch continues.

mod error;
mod metadata;

pub mod blocklist;
pub mod compile;
pub mod config;
pub mod hosts;
pub mod payload;
pub mod tool;

// Re-export core types
pub use error::{Error, Result};

pub use blocklist::{BlocklistFetcher, Source};
pub use compile::{BatchCompiler, BatchReport};
pub use config::Config;
pub use metadata::ToolMetadata;
pub use payload::RuleList;
pub use tool::{Platform, ToolManager};
