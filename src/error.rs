use thiserror::Error;

/// Failures callers need to tell apart; everything else travels as `anyhow::Error`
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("refusing to modify data in the '{0}' environment without --force")]
    UnsafeEnvironment(String),

    #[error("--env {requested} does not match APP_ENV={app_env}; pass --force to seed anyway")]
    EnvironmentMismatch { app_env: String, requested: String },

    #[error("deploy verification failed with {0} critical issue(s)")]
    DeployCheckFailed(usize),
}

/// Turn a `RowNotFound` from a single-row fetch into `AppError::NotFound`
pub fn not_found(entity: &'static str, id: i32) -> impl FnOnce(sqlx::Error) -> anyhow::Error {
    move |err| match err {
        sqlx::Error::RowNotFound => AppError::NotFound { entity, id }.into(),
        other => other.into(),
    }
}

/// Turn a unique-constraint violation into `AppError::Validation`
pub fn already_exists(message: String) -> impl FnOnce(sqlx::Error) -> anyhow::Error {
    move |err| match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Validation(message).into(),
        other => other.into(),
    }
}

/// Text to show the user for a validation failure; any other error is handed back
pub fn validation_message(err: anyhow::Error) -> anyhow::Result<String> {
    match err.downcast_ref::<AppError>() {
        Some(validation @ AppError::Validation(_)) => Ok(validation.to_string()),
        _ => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_app_error() {
        let err = not_found("project", 42)(sqlx::Error::RowNotFound);
        match err.downcast_ref::<AppError>() {
            Some(AppError::NotFound { entity, id }) => {
                assert_eq!(*entity, "project");
                assert_eq!(*id, 42);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.to_string(), "project with id 42 not found");
    }

    #[test]
    fn test_other_sqlx_errors_pass_through() {
        let err = not_found("task", 1)(sqlx::Error::PoolTimedOut);
        assert!(err.downcast_ref::<AppError>().is_none());
        assert!(err.downcast_ref::<sqlx::Error>().is_some());
    }

    #[test]
    fn test_already_exists_only_maps_unique_violations() {
        let err = already_exists("a project named 'Atlas' already exists".to_string())(sqlx::Error::PoolTimedOut);
        assert!(err.downcast_ref::<AppError>().is_none());
        assert!(err.downcast_ref::<sqlx::Error>().is_some());
    }

    #[test]
    fn test_validation_message_keeps_other_errors() {
        let err = anyhow::Error::from(AppError::Validation("a task named 'Deploy' already exists".to_string()));
        assert_eq!(
            validation_message(err).unwrap(),
            "invalid input: a task named 'Deploy' already exists"
        );

        let err = anyhow::Error::from(AppError::NotFound { entity: "task", id: 3 });
        assert!(validation_message(err).is_err());
        assert!(validation_message(anyhow::Error::from(sqlx::Error::PoolTimedOut)).is_err());
    }
}
