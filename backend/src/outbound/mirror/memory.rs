//! Process-memory local mirror.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;

use crate::domain::ports::{LocalMirror, LocalMirrorError, MirrorKey};

/// [`LocalMirror`] that forgets everything when dropped.
#[derive(Default)]
pub struct MemoryMirror {
    entries: Mutex<HashMap<MirrorKey, Value>>,
}

impl LocalMirror for MemoryMirror {
    fn read(&self, key: MirrorKey) -> Result<Option<Value>, LocalMirrorError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(&key).cloned())
    }

    fn write(&self, key: MirrorKey, value: &Value) -> Result<(), LocalMirrorError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key, value.clone());
        Ok(())
    }

    fn remove(&self, key: MirrorKey) -> Result<(), LocalMirrorError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(&key);
        Ok(())
    }
}
