//! Hoist Core Library
//!
//! Installs versioned application artifacts onto a host and manages the
//! lifecycle of the supervised services derived from them.

pub mod archive;
pub mod audit;
pub mod config;
pub mod context;
pub mod error;
pub mod fetch;
pub mod launchable;
pub mod supervisor;

pub use error::{LaunchableError, Result};

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{ConfigReader, ConfigStore, HoistConfig, LaunchableEntry};
    pub use crate::context::AppContext;

    // Engine
    pub use crate::error::{LaunchableError, Result};
    pub use crate::launchable::{
        Executable, HookResult, Launchable, ServiceLifecycle, StopPolicy,
    };

    // Collaborators
    pub use crate::fetch::{FetchError, Fetcher, HttpFetcher};
    pub use crate::supervisor::{
        RunitSupervisor, Service, ServiceTemplate, Supervisor, SupervisorError,
    };
}
