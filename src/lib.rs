//! hadoopconf - layered Hadoop cluster configuration
//!
//! Resolves property values across site override files and the default
//! property sets packaged inside the installed jars, tracks where each
//! value came from, and writes changes back safely. Shell environment
//! files (`*-env.sh`) are edited line by line, leaving untouched lines
//! byte-identical.

pub mod env;
pub mod error;
pub mod layer;
pub mod locator;
pub mod logging;
pub mod persist;
pub mod property;
pub mod resolve;
pub mod settings;
pub mod subsystem;

pub use env::{EnvError, EnvFile, EnvFileSet, EnvVar};
pub use error::ConfigError;
pub use layer::{ConfSource, ConfigLayer, MultiSourceConfig};
pub use property::{Property, PropertySet, Source, SourceKind};
pub use resolve::{DefaultSets, HadoopConf, ResolveContext, StatEntry};
pub use settings::{Settings, SettingsError};
pub use subsystem::Subsystem;
