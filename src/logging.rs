use std::fmt;

use crate::identity::Identity;
use crate::request::Request;

/// Name logged for requests without a user.
const ANONYMOUS: &str = "AnonymousUser";

/// Request-scoped logger.
///
/// Every line carries the request id and the acting user, so gate decisions
/// and queue failures can be correlated with the request that caused them.
#[derive(Debug, Clone, Copy)]
pub struct RequestLog<'a> {
    request_id: &'a str,
    user: &'a str,
}

impl<'a> RequestLog<'a> {
    /// Creates a logger for one request.
    pub fn new(request: &'a Request, identity: &'a Identity) -> Self {
        let user = if identity.is_authenticated() {
            identity.username()
        } else {
            ANONYMOUS
        };
        Self {
            request_id: request.request_id(),
            user,
        }
    }

    /// Returns the request ID associated with this logger.
    pub fn request_id(&self) -> &str {
        self.request_id
    }

    /// Returns the user name logged with each line.
    pub fn user(&self) -> &str {
        self.user
    }

    /// Logs an info-level message.
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(request_id = %self.request_id, user = %self.user, "{}", args);
    }

    /// Logs a warning-level message.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(request_id = %self.request_id, user = %self.user, "{}", args);
    }

    /// Logs an error-level message.
    pub fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!(request_id = %self.request_id, user = %self.user, "{}", args);
    }

    /// Logs a debug-level message.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(request_id = %self.request_id, user = %self.user, "{}", args);
    }
}
