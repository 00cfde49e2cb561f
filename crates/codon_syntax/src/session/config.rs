//! Token session configuration.

/// Token session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Record a checkpoint before every token (needed for incremental reparse)
    pub checkpoints: bool,
    /// Decorator names whose function body is an opaque extern block
    pub extern_decorators: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            checkpoints: true,
            extern_decorators: vec!["llvm".to_string(), "python".to_string()],
        }
    }
}

impl SessionConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable checkpoint recording
    pub fn with_checkpoints(mut self, checkpoints: bool) -> Self {
        self.checkpoints = checkpoints;
        self
    }

    /// Replace the set of extern decorators
    pub fn with_extern_decorators<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extern_decorators = names.into_iter().map(Into::into).collect();
        self
    }

    /// Return `true` if `name` marks an extern block
    pub fn is_extern_decorator(&self, name: &str) -> bool {
        self.extern_decorators.iter().any(|d| d == name)
    }
}
