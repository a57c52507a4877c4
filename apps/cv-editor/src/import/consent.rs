use crate::storage::{KeyValueStore, StorageError, CONSENT_KEY};

const GRANTED: &str = "true";

/// Persisted user consent for sending documents to the AI service.
pub struct ConsentGate;

impl ConsentGate {
    /// Only the exact stored value `"true"` counts as consent; read failures
    /// count as no consent.
    pub fn is_granted<S: KeyValueStore>(storage: &S) -> bool {
        matches!(storage.get(CONSENT_KEY), Ok(Some(value)) if value == GRANTED)
    }

    pub fn grant<S: KeyValueStore>(storage: &mut S) -> Result<(), StorageError> {
        storage.set(CONSENT_KEY, GRANTED)
    }

    pub fn revoke<S: KeyValueStore>(storage: &mut S) -> Result<(), StorageError> {
        storage.remove(CONSENT_KEY)
    }
}
