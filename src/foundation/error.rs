/// Convenience result type used across reelcast.
pub type StudioResult<T> = Result<T, StudioError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum StudioError {
    /// Bad duration, fps, frame count, or other user-provided configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Pixel buffer whose length does not match its declared dimensions.
    #[error("invalid buffer: {0}")]
    InvalidBuffer(String),

    /// Fit-to-audio was requested but no decoded audio is loaded.
    #[error("missing audio: {0}")]
    MissingAudio(String),

    /// A required encoding capability is absent on this host.
    #[error("capability missing: {0}")]
    CapabilityMissing(String),

    /// The offloaded filter worker faulted.
    #[error("filter execution error: {0}")]
    FilterExecution(String),

    /// The encoder sink reported an unrecoverable failure.
    #[error("encoder error: {0}")]
    Encoder(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StudioError {
    /// Build a [`StudioError::InvalidConfig`] value.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Build a [`StudioError::InvalidBuffer`] value.
    pub fn invalid_buffer(msg: impl Into<String>) -> Self {
        Self::InvalidBuffer(msg.into())
    }

    /// Build a [`StudioError::MissingAudio`] value.
    pub fn missing_audio(msg: impl Into<String>) -> Self {
        Self::MissingAudio(msg.into())
    }

    /// Build a [`StudioError::CapabilityMissing`] value.
    pub fn capability_missing(msg: impl Into<String>) -> Self {
        Self::CapabilityMissing(msg.into())
    }

    /// Build a [`StudioError::FilterExecution`] value.
    pub fn filter_execution(msg: impl Into<String>) -> Self {
        Self::FilterExecution(msg.into())
    }

    /// Build a [`StudioError::Encoder`] value.
    pub fn encoder(msg: impl Into<String>) -> Self {
        Self::Encoder(msg.into())
    }

    /// `true` for errors raised before generation starts (config, audio, capability).
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_) | Self::MissingAudio(_) | Self::CapabilityMissing(_)
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
