//! Tiered configuration.
//!
//! Consolidates configuration from several tiers with field-by-field YAML merging:
//! 1. **Defaults** - Compiled-in values
//! 2. **Project** - `$CWD/fogg-task/config.yaml`
//! 3. **User** - `~/.fogg-task/config.yaml`
//! 4. **Environment** - variables listed below
//!
//! Command-line flags are applied on top by the binary.
//!
//! ## Environment Variables
//! - `FOGG_TASK_CONFIG_PATH` - Explicit config file (replaces the file tiers)
//! - `FOGG_TASK_DB_PATH` - Database path
//! - `FOGG_TASK_PORT` - Listen port
//! - `FOGG_TASK_USER_DIR` - User config dir (default: `~/.fogg-task`)
//! - `FOGG_TASK_PROJECT_DIR` - Project config dir (default: `./fogg-task`)

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
