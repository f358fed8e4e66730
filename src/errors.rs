use crate::pocketbase::ClientError;
use axum::http::StatusCode;

pub const COUNTER_SETUP_HINT: &str = "PocketBase collections are missing. Run `docker compose down -v && docker compose up --build pocketbase` to reapply migrations.";
pub const CHART_SETUP_HINT: &str = "PocketBase collections are missing. Seed data with `go run ./pocketbase/seeders/valuequarters` after exporting PB_ADMIN_EMAIL and PB_ADMIN_PASSWORD.";

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    SetupRequired(&'static str),
    #[error("Failed to {action}: {source}")]
    Backend {
        action: &'static str,
        #[source]
        source: ClientError,
    },
}

impl ServiceError {
    /// Missing collections become the setup hint, anything else keeps its cause.
    pub fn from_client(err: ClientError, action: &'static str, hint: &'static str) -> Self {
        if err.is_not_found() {
            ServiceError::SetupRequired(hint)
        } else {
            ServiceError::Backend { action, source: err }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("POCKETBASE_URL must be an http(s) URL, got {0:?}")]
    InvalidUrl(String),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let status = match err {
            ServiceError::SetupRequired(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Backend { .. } => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_setup_hint() {
        let err = ClientError::Api {
            status: 404,
            message: "The requested resource wasn't found.".into(),
        };
        let err = ServiceError::from_client(err, "increment counter", COUNTER_SETUP_HINT);
        assert_eq!(err.to_string(), COUNTER_SETUP_HINT);
        assert_eq!(AppError::from(err).status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn other_failures_keep_cause() {
        let err = ClientError::Api {
            status: 500,
            message: "database is locked".into(),
        };
        let err = ServiceError::from_client(err, "increment counter", COUNTER_SETUP_HINT);
        assert_eq!(err.to_string(), "Failed to increment counter: database is locked");
        assert_eq!(AppError::from(err).status, StatusCode::BAD_GATEWAY);
    }
}
