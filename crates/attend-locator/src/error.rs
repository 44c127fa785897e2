use thiserror::Error;

/// Failure reported by a position provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// The user or platform refused location access.
    #[error("{}", permission_message(*insecure_origin))]
    PermissionDenied {
        /// Access was refused because the page is not served from a secure
        /// context (plain HTTP instead of HTTPS or localhost).
        insecure_origin: bool,
    },

    /// No fix could be produced; the receiver may come online later.
    #[error("position unavailable: {0}")]
    PositionUnavailable(String),

    /// The request did not complete within its timeout.
    #[error("timed out waiting for a position fix")]
    Timeout,
}

fn permission_message(insecure_origin: bool) -> &'static str {
    if insecure_origin {
        "location access requires a secure connection (HTTPS or localhost)"
    } else {
        "location permission denied; allow location access and try again"
    }
}

impl LocationError {
    /// Returns `true` for failures worth retrying after a back-off delay.
    ///
    /// **Retriable:** [`LocationError::PositionUnavailable`],
    /// [`LocationError::Timeout`].
    ///
    /// **Not retriable:** [`LocationError::PermissionDenied`]; only the user
    /// can fix it.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            LocationError::PositionUnavailable(_) | LocationError::Timeout => true,
            LocationError::PermissionDenied { .. } => false,
        }
    }
}

/// Errors returned while waiting on a [`crate::LocatorSession`].
#[derive(Debug, Error)]
pub enum LocatorError {
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error("location session ended before a fix was acquired")]
    SessionClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_is_not_retryable() {
        assert!(!LocationError::PermissionDenied {
            insecure_origin: false
        }
        .is_retryable());
        assert!(!LocationError::PermissionDenied {
            insecure_origin: true
        }
        .is_retryable());
    }

    #[test]
    fn transient_errors_are_retryable() {
        assert!(LocationError::Timeout.is_retryable());
        assert!(LocationError::PositionUnavailable("no satellites".to_owned()).is_retryable());
    }

    #[test]
    fn insecure_origin_has_its_own_message() {
        let insecure = LocationError::PermissionDenied {
            insecure_origin: true,
        }
        .to_string();
        let denied = LocationError::PermissionDenied {
            insecure_origin: false,
        }
        .to_string();
        assert_ne!(insecure, denied);
        assert!(insecure.contains("HTTPS"), "{insecure}");
    }
}
