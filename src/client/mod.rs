//! The client side of the relay: backend address resolution, the compose
//! call with candidate fallback, and locally persisted history and settings.

pub mod relay;
pub mod resolver;
pub mod runtime_config;
pub mod store;

pub use relay::{ComposeOptions, RelayClient, RelayError};
pub use resolver::{resolve_base_candidates, ClientEnv};
pub use runtime_config::{load_runtime_config, RuntimeConfig};
pub use store::{ClientStore, Settings};
