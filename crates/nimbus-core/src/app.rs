use crate::{AppError, Config};

/// Application state and lifecycle manager
pub struct App {
    config: Config,
}

impl App {
    /// Create a new application instance from the user's config file
    pub fn new() -> Result<Self, AppError> {
        let (config, validation) = Config::load_validated()?;
        tracing::debug!(
            "Loaded configuration with {} warning(s)",
            validation.warnings.len()
        );
        Ok(Self::with_config(config))
    }

    /// Create an application instance from an already-built config
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Shutdown the application
    pub fn shutdown(&mut self) {
        tracing::info!("Shutting down application");
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }
}
