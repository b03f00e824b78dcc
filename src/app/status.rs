//! Last error and loading indicator shown alongside the grid.

use crate::domain::OperationError;

/// Error/status channel read by the rendering layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusChannel {
    error: Option<OperationError>,
    loading: bool,
}

impl StatusChannel {
    #[must_use]
    pub const fn error(&self) -> Option<&OperationError> {
        self.error.as_ref()
    }

    /// True only while the initial (empty-cache) load is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Records a failure, replacing any previous one.
    pub fn fail(&mut self, error: OperationError) {
        tracing::debug!(
            status_code = error.status_code,
            kind = ?error.kind,
            message = %error.message,
            "operation error recorded"
        );
        self.error = Some(error);
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_failure_wins() {
        let mut status = StatusChannel::default();
        status.fail(OperationError::from_status(500, None));
        status.fail(OperationError::from_status(404, Some("gone".into())));
        assert_eq!(status.error().map(|e| e.status_code), Some(404));

        status.clear_error();
        assert!(status.error().is_none());
    }
}
