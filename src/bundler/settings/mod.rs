//! Configuration structures for bundling operations.
//!
//! [`BundlingOptions`] is the immutable, validated input of one bundling request,
//! constructed through [`BundlingOptionsBuilder`].

mod arch;
mod builder;
mod hooks;
mod options;
mod runtime;

pub use arch::Architecture;
pub use builder::BundlingOptionsBuilder;
pub use hooks::{CommandHooks, TemplateHooks};
pub use options::{
    AssetHash, BundlingOptions, Charset, EsbuildArg, LogLevel, OutputFormat, SourceMapMode,
};
pub use runtime::Runtime;
