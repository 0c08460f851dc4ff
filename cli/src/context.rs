use std::path::{Path, PathBuf};

use gallery_wall_core::{
    EngineConfig, EngineConfigExt, MemoryStorage, PreferenceStore, RouteCapabilityMatcher,
};

/// Holds all state for a CLI session.
///
/// Preferences live in an in-memory store so edits made in the REPL carry
/// over into later `variables` and `preview` commands.
pub struct CliContext {
    pub config: EngineConfig,
    /// File the active config came from, `None` for built-in defaults
    pub config_path: Option<PathBuf>,
    store: PreferenceStore<MemoryStorage>,
}

impl CliContext {
    pub fn new() -> Self {
        let mut store = PreferenceStore::new(MemoryStorage::new());
        store.load();
        Self {
            config: EngineConfig::default(),
            config_path: None,
            store,
        }
    }

    /// Start with a config file, failing if it does not load and validate
    pub fn with_config_file(path: &Path) -> Result<Self, String> {
        let mut ctx = Self::new();
        let config = read_config(path)?;
        ctx.replace_config(config, path.to_path_buf());
        Ok(ctx)
    }

    pub fn replace_config(&mut self, config: EngineConfig, path: PathBuf) {
        self.config = config;
        self.config_path = Some(path);
    }

    pub fn matcher(&self) -> RouteCapabilityMatcher {
        RouteCapabilityMatcher::new(&self.config.routes)
    }

    pub fn store(&self) -> &PreferenceStore<MemoryStorage> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PreferenceStore<MemoryStorage> {
        &mut self.store
    }
}

impl Default for CliContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Read, parse and validate an engine config, flattening the error chain
pub fn read_config(path: &Path) -> Result<EngineConfig, String> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    EngineConfig::from_toml_str(&source).map_err(|e| error_chain(&e))
}

pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
