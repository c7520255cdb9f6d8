//! # Configuration System
//!
//! Hierarchical TOML configuration for avision.
//!
//! ## Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.avision/config.toml` (global user preferences)
//! 3. **Project config** - `./.avision/config.toml` (project-specific overrides)
//! 4. **CLI arguments** - Command-line flags (highest priority)
//!
//! ## Usage Example
//!
//! ```toml
//! # ~/.avision/config.toml
//! [server]
//! origin = "http://192.168.1.20:5500"
//!
//! [poll]
//! base_interval_ms = 250
//! background_interval_ms = 1200
//! ```
//!
//! ```rust,no_run
//! use avision_core::config::AvisionConfig;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AvisionConfig::load_hierarchy()?;
//!     let base_url = config.initial_base_url()?;
//!     println!("polling {}", base_url);
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

pub use types::{AvisionConfig, PollConfig, ServerConfig};
pub use validation::validate_config;

impl AvisionConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, crate::errors::ConfigError> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), crate::errors::ConfigError> {
        validation::validate_config(self)
    }

    /// Base URL used when the user supplies none (or a blank one).
    pub fn default_base_url(&self) -> Result<String, crate::errors::ConfigError> {
        loading::default_base_url(self)
    }

    /// Base URL to start polling with.
    pub fn initial_base_url(&self) -> Result<String, crate::errors::ConfigError> {
        loading::initial_base_url(self)
    }
}
