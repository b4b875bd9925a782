//! Resolution of declarative build and test configuration.
//!
//! A configuration is a list of rules:
//!
//! ```text
//! [
//!     include("./vendor-config", optional=True),
//!     build(projects=["generic-arm64"], enabled=True),
//!     testmap(projects=["generic-arm64"],
//!             tests=[hosttest("kernel-tests"), boottest("com.example.smoke")]),
//! ]
//! ```
//!
//! A [`Loader`] reads a named config through a [`ConfigSource`] and splices
//! includes in place, producing a flat [`Document`]. [`resolve`] folds the
//! document into a [`DecisionTable`] answering, per project, whether it is
//! built and which tests belong to it.
//!
//! ```
//! use buildcfg::{Loader, MemorySource};
//!
//! let source = MemorySource::new()
//!     .with("main", r#"include("common") build(projects=["b"], enabled=False)"#)
//!     .with("common", r#"build(projects=["a", "b"], enabled=True)"#);
//!
//! let table = Loader::new(source).load("main").unwrap().resolve();
//! assert!(table.lookup("a").enabled);
//! assert!(!table.lookup("b").enabled);
//! ```

mod error;
mod load;
pub mod parse;
mod resolve;
mod source;
mod types;

#[cfg(feature = "binary-cache")]
pub mod serial;

pub use error::LoadError;
pub use load::Loader;
pub use parse::ParseError;
pub use resolve::resolve;
pub use source::{ConfigSource, FsSource, MemorySource};
pub use types::{
    BuildDepRule, BuildRule, DecisionTable, Document, DocumentBuilder, IncludeRule,
    ProjectDecision, ProjectFilter, Rule, TestListBuilder, TestMapRule,
};

#[cfg(feature = "binary-cache")]
pub use serial::{DeserializeError, SerializeError};
