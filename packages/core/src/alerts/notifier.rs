use async_trait::async_trait;

use crate::error::NotifyError;
use crate::rates::RateObservation;

/// Sink for rate-drop notifications.
#[async_trait]
pub trait Notifier {
    /// Tell the recipient that the rate fell from `previous` to `current`.
    async fn notify_drop(
        &self,
        previous: &RateObservation,
        current: &RateObservation,
    ) -> Result<(), NotifyError>;
}
