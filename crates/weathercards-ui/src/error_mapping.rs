use weathercards_core::{AppError, ConfigError, DataError, NetworkError, ReqwestErrorExt};
use weathercards_weather::{StoreError, SyncOp, ThemeError};

/// Extension trait for lifting data store errors into the application hierarchy.
pub trait StoreErrorExt {
    fn into_app_error(self) -> AppError;
}

impl StoreErrorExt for StoreError {
    fn into_app_error(self) -> AppError {
        match self {
            StoreError::Network(e) => AppError::Network(e.into_network_error()),
            StoreError::Status { status, message } => {
                AppError::Network(NetworkError::ServerError { status, message })
            }
            StoreError::ContentType(s) | StoreError::Parse(s) => {
                AppError::Network(NetworkError::InvalidResponse(s))
            }
            StoreError::InvalidUrl(s) => AppError::Config(ConfigError::Invalid(s)),
            StoreError::NotFound(id) => AppError::Data(DataError::CityNotFound(id.to_string())),
            StoreError::MissingWeather(id) => {
                AppError::Data(DataError::MissingWeather(id.to_string()))
            }
            StoreError::InvalidPatch(s) => AppError::Data(DataError::InvalidUpdate(s)),
        }
    }
}

/// Error for a change the remote store did not accept
pub fn sync_failure(op: SyncOp, message: String) -> AppError {
    match op {
        SyncOp::Update => AppError::Data(DataError::UpdateFailed(message)),
        SyncOp::Delete => AppError::Data(DataError::DeleteFailed(message)),
    }
}

/// Error for a theme preference that could not be saved
pub fn theme_failure(error: ThemeError) -> AppError {
    match error {
        ThemeError::Io(e) => AppError::Io(e),
        other => AppError::Other(other.into()),
    }
}
