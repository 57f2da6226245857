//! Remote label inventory

use crate::error::TrackerError;
use crate::label::RemoteLabelSet;
use crate::tracker::IssueTracker;
use log::debug;

/// Fetch every label of the tracker's repository as a name -> color map
///
/// Duplicate names in the listing keep the color seen last. Errors are
/// returned untouched; without a baseline no reconciliation may start.
pub async fn load_remote_labels(
    tracker: &dyn IssueTracker,
) -> Result<RemoteLabelSet, TrackerError> {
    let labels = tracker.list_labels().await?;
    let listed = labels.len();
    let remote = RemoteLabelSet::from_labels(labels);

    debug!(
        "Loaded {} remote labels from {} ({} listed)",
        remote.len(),
        tracker.repository(),
        listed
    );
    Ok(remote)
}
