//! Error types for tracking sessions and configuration loading.

use serde::Deserialize;

/// Why an AR session could not be created on this device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// The tracking runtime is not installed.
    NotInstalled,
    /// The user declined to install the tracking runtime.
    UserDeclinedInstallation,
    /// The installed tracking runtime is older than this app requires.
    ApkTooOld,
    /// This app was built against an older SDK than the runtime requires.
    SdkTooOld,
    /// The device cannot run AR at all.
    DeviceNotCompatible,
}

impl UnavailableReason {
    /// Short message suitable for showing to the user.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::NotInstalled | Self::UserDeclinedInstallation => "Please install ARCore",
            Self::ApkTooOld => "Please update ARCore",
            Self::SdkTooOld => "Please update this app",
            Self::DeviceNotCompatible => "This device does not support AR",
        }
    }
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.user_message())
    }
}

/// Errors reported by a [`TrackingSession`](crate::tracking::TrackingSession).
///
/// None of these are fatal to the render loop: callers log and skip the
/// action for the current tick.
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("camera is not available (claimed by another process?)")]
    CameraNotAvailable,

    #[error("session is paused; resume it before requesting frames")]
    SessionPaused,

    #[error("tracking was lost while creating an anchor")]
    NotTracking,

    #[error("AR session unavailable: {0}")]
    Unavailable(UnavailableReason),

    #[error("tracking session failure: {0}")]
    Other(String),
}

impl TrackingError {
    /// Message shown to the user when session creation fails.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unavailable(reason) => reason.user_message(),
            _ => "Failed to create AR session",
        }
    }
}

/// Errors raised while loading an [`ArConfig`](crate::config::ArConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid clip planes: near={near}, far={far}")]
    InvalidClipPlanes { near: f32, far: f32 },
}
