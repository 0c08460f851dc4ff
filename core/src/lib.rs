pub mod config;
pub mod decorate;
pub mod dom;
pub mod lifecycle;
pub mod paint;
pub mod preferences;
pub mod routes;
pub mod storage;

// Re-exports for convenience
pub use config::{ConfigError, EngineConfigExt, SiteScope};
pub use decorate::{DecorationOutcome, DecorationReport, DomDecorator};
pub use dom::{HostDom, MemoryDom, NodeId};
pub use gallery_wall_types::*;
pub use lifecycle::{LifecycleCoordinator, LifecyclePhase, ManualScheduler, Scheduler, TimerHandle};
pub use paint::{MemoryStyleHost, StyleError, StyleHost, StyleVariableSet, VariableBinder};
pub use preferences::{EditRejected, PreferenceStore};
pub use routes::RouteCapabilityMatcher;
pub use storage::{KeyValueStorage, MemoryStorage, StorageError};
