//! # Toasts
//!
//! Transient notifications queued by view operations for the UI to drain.
//!
//! ```text
//! productos::crear ──► Ok  ──► toaster.success("Producto creado")
//!                  └─► Err ──► toaster.error(err.message)
//!
//! UI render loop ──► toaster.drain() ──► show + auto-dismiss
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::AppError;

/// Oldest toasts are dropped past this many.
pub const MAX_PENDING_TOASTS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Per-tab toast queue. Clones share the queue.
#[derive(Debug, Clone, Default)]
pub struct Toaster {
    queue: Arc<Mutex<VecDeque<Toast>>>,
    next_id: Arc<AtomicU64>,
}

impl Toaster {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Toast>> {
        // A panic while holding the lock leaves the queue usable.
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, kind: ToastKind, message: impl Into<String>) {
        let toast = Toast {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            kind,
            message: message.into(),
            created_at: Utc::now(),
        };

        let mut queue = self.lock();
        if queue.len() >= MAX_PENDING_TOASTS {
            queue.pop_front();
        }
        queue.push_back(toast);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(ToastKind::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(ToastKind::Error, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(ToastKind::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.push(ToastKind::Warning, message);
    }

    pub fn report(&self, err: &AppError) {
        self.error(err.message.clone());
    }

    /// Takes every pending toast, oldest first.
    pub fn drain(&self) -> Vec<Toast> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Most recent toast, without removing it.
    pub fn last(&self) -> Option<Toast> {
        self.lock().back().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_in_order() {
        let toaster = Toaster::new();
        toaster.success("Producto creado");
        toaster.error("Credenciales inválidas");

        let toasts = toaster.drain();
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].kind, ToastKind::Success);
        assert_eq!(toasts[1].message, "Credenciales inválidas");
        assert!(toasts[0].id < toasts[1].id);
        assert!(toaster.is_empty());
    }

    #[test]
    fn test_queue_is_bounded() {
        let toaster = Toaster::new();
        for i in 0..(MAX_PENDING_TOASTS + 5) {
            toaster.info(format!("aviso {}", i));
        }
        let toasts = toaster.drain();
        assert_eq!(toasts.len(), MAX_PENDING_TOASTS);
        assert_eq!(toasts[0].message, "aviso 5");
    }

    #[test]
    fn test_clones_share_queue() {
        let toaster = Toaster::new();
        let other = toaster.clone();
        other.warning("Stock bajo");
        assert_eq!(toaster.last().map(|t| t.kind), Some(ToastKind::Warning));
    }
}
