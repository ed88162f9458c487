use std::path::PathBuf;

/// Errors that stop the demo from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The graphics capability the renderer needs is missing. Detected once,
    /// before any device context state exists.
    #[error("graphics capability unavailable ({capability}): {reason}")]
    CapabilityUnavailable { capability: String, reason: String },
    #[error("window creation failed: {0}")]
    Window(String),
}

impl StartupError {
    pub fn capability(capability: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CapabilityUnavailable {
            capability: capability.into(),
            reason: reason.into(),
        }
    }

    /// Human-readable message for the host to display instead of a scene.
    pub fn diagnostic(&self) -> String {
        match self {
            StartupError::CapabilityUnavailable { capability, reason } => format!(
                "Your graphics driver or GPU does not seem to support {capability}.\n\
                 Reason: {reason}\n\
                 Try updating your graphics drivers, or set WGPU_BACKEND to pick another backend."
            ),
            StartupError::Window(reason) => format!("Could not open a window: {reason}"),
        }
    }
}

/// Errors from loading a [`LightboxConfig`](crate::LightboxConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_diagnostic_names_the_capability() {
        let err = StartupError::capability("wgpu adapter", "no compatible adapter found");
        let text = err.diagnostic();
        assert!(text.contains("wgpu adapter"));
        assert!(text.contains("no compatible adapter found"));
        assert!(err.to_string().starts_with("graphics capability unavailable"));
    }
}
