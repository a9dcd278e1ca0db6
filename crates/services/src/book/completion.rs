use storage::StorageError;
use tracing::info;

use super::progression::ProgressionController;

/// Detects the transition into "every reward collected".
///
/// The persisted celebrated flag is the edge marker: the engine can be rebuilt
/// at any time, so there is no earlier in-memory snapshot to compare against.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionTrigger;

impl CompletionTrigger {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns `true` exactly when the completed signal should fire.
    ///
    /// The flag is persisted before returning `true`, so a failed write
    /// leaves the edge armed for the next check.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the celebrated flag cannot be persisted.
    pub async fn check(&self, controller: &mut ProgressionController) -> Result<bool, StorageError> {
        if !controller.is_complete() || controller.state().celebrated() {
            return Ok(false);
        }
        controller.mark_celebrated().await?;
        info!(total = controller.catalog().len(), "sticker book completed");
        Ok(true)
    }
}
