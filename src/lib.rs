//! Template context trees built from JSON or YAML.
//!
//! `Data` is the owned tree the renderer walks, `DataStack` the bounded chain
//! of scopes it keeps while resolving names. `Data::from_json` and
//! `Data::from_yaml` build trees; each backend sits behind a cargo feature and
//! reports `Error::FeatureDisabled` when compiled out.
pub mod backend;
pub mod data;
pub mod error;
#[cfg(feature = "json")]
pub mod json;
pub mod stack;
#[cfg(feature = "yaml")]
pub mod yaml;

pub use backend::Backend;
pub use data::{Data, Tag};
pub use error::{Error, Result};
pub use stack::{DataStack, MAXSIZE};
