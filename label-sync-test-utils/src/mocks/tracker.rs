//! In-memory issue tracker for testing

use label_sync_core::tracker::{IssueTracker, RepositoryRef};
use label_sync_core::{Label, LabelSet, TrackerError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type MutationHook = Box<dyn FnOnce() + Send>;

/// A call received by [`MockIssueTracker`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerCall {
    List,
    Create { name: String, color: String },
    Edit { name: String, color: String },
    Delete { name: String },
}

impl TrackerCall {
    /// The label a mutating call targets
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::List => None,
            Self::Create { name, .. } | Self::Edit { name, .. } | Self::Delete { name } => {
                Some(name)
            }
        }
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::List)
    }
}

/// Mock implementation of [`IssueTracker`]
///
/// Holds a mutable label table that successful create, edit and delete calls
/// are applied to, and records every call it receives.
///
/// # Examples
///
/// ```rust,no_run
/// use label_sync_test_utils::MockIssueTracker;
/// use label_sync_core::TrackerError;
///
/// let tracker = MockIssueTracker::new()
///     .with_label("P0", "b60205")
///     .with_failure("P1", TrackerError::api(422, "Validation Failed"));
/// assert!(tracker.calls().is_empty());
/// ```
pub struct MockIssueTracker {
    repository: RepositoryRef,
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    labels: Vec<Label>,
    calls: Vec<TrackerCall>,
    list_error: Option<TrackerError>,
    failures: HashMap<String, TrackerError>,
    on_mutation: Option<MutationHook>,
}

impl Default for MockIssueTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl MockIssueTracker {
    /// Create an empty tracker for `test-owner/test-repo`
    pub fn new() -> Self {
        Self {
            repository: RepositoryRef::new("test-owner", "test-repo")
                .expect("static repository reference is valid"),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Seed a remote label
    pub fn with_label(self, name: &str, color: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .labels
            .push(Label::new(name, color));
        self
    }

    /// Seed every label of a set
    pub fn with_labels(self, labels: &LabelSet) -> Self {
        self.state.lock().unwrap().labels.extend(labels.to_labels());
        self
    }

    /// Make the label listing fail
    pub fn with_list_error(self, error: TrackerError) -> Self {
        self.state.lock().unwrap().list_error = Some(error);
        self
    }

    /// Make every mutating call for `name` fail
    pub fn with_failure(self, name: &str, error: TrackerError) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(name.to_string(), error);
        self
    }

    /// Run `hook` after the first successful mutation
    pub fn on_first_mutation(self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.state.lock().unwrap().on_mutation = Some(Box::new(hook));
        self
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<TrackerCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Create, edit and delete calls received so far
    pub fn mutation_calls(&self) -> Vec<TrackerCall> {
        self.calls().into_iter().filter(|c| c.is_mutation()).collect()
    }

    /// Calls that targeted `name`
    pub fn calls_for(&self, name: &str) -> Vec<TrackerCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.label() == Some(name))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Current remote labels, after applied mutations
    pub fn labels(&self) -> LabelSet {
        LabelSet::from_labels(self.state.lock().unwrap().labels.clone())
    }

    fn record(&self, call: TrackerCall) -> Result<(), TrackerError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.clone());

        if let Some(error) = call.label().and_then(|name| state.failures.get(name)) {
            return Err(error.clone());
        }
        Ok(())
    }

    fn mutated(&self) {
        let hook = self.state.lock().unwrap().on_mutation.take();
        if let Some(hook) = hook {
            hook();
        }
    }
}

#[async_trait::async_trait]
impl IssueTracker for MockIssueTracker {
    fn repository(&self) -> &RepositoryRef {
        &self.repository
    }

    async fn list_labels(&self) -> Result<Vec<Label>, TrackerError> {
        self.record(TrackerCall::List)?;

        let state = self.state.lock().unwrap();
        match &state.list_error {
            Some(error) => Err(error.clone()),
            None => Ok(state.labels.clone()),
        }
    }

    async fn create_label(&self, label: &Label) -> Result<Label, TrackerError> {
        self.record(TrackerCall::Create {
            name: label.name.clone(),
            color: label.color.clone(),
        })?;

        {
            let mut state = self.state.lock().unwrap();
            if state.labels.iter().any(|l| l.name == label.name) {
                return Err(TrackerError::api(422, "Validation Failed: already_exists"));
            }
            state.labels.push(label.clone());
        }
        self.mutated();
        Ok(label.clone())
    }

    async fn edit_label(&self, name: &str, label: &Label) -> Result<Label, TrackerError> {
        self.record(TrackerCall::Edit {
            name: name.to_string(),
            color: label.color.clone(),
        })?;

        {
            let mut state = self.state.lock().unwrap();
            let Some(existing) = state.labels.iter_mut().find(|l| l.name == name) else {
                return Err(TrackerError::api(404, "Not Found"));
            };
            *existing = label.clone();
        }
        self.mutated();
        Ok(label.clone())
    }

    async fn delete_label(&self, name: &str) -> Result<(), TrackerError> {
        self.record(TrackerCall::Delete {
            name: name.to_string(),
        })?;

        {
            let mut state = self.state.lock().unwrap();
            let before = state.labels.len();
            state.labels.retain(|l| l.name != name);
            if state.labels.len() == before {
                return Err(TrackerError::api(404, "Not Found"));
            }
        }
        self.mutated();
        Ok(())
    }
}
