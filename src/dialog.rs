use std::collections::VecDeque;

/// Runs against the owner of the queue once its message is dismissed.
pub type DismissHook<T> = Box<dyn FnOnce(&mut T)>;

pub struct ErrorDialog<T> {
    message: String,
    on_dismiss: Option<DismissHook<T>>,
}

impl<T> ErrorDialog<T> {
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Modal error messages, shown one at a time in the order they were raised.
pub struct ErrorQueue<T> {
    pending: VecDeque<ErrorDialog<T>>,
}

impl<T> Default for ErrorQueue<T> {
    fn default() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }
}

impl<T> ErrorQueue<T> {
    pub fn show_error(&mut self, message: impl Into<String>, on_dismiss: Option<DismissHook<T>>) {
        let message = message.into();
        tracing::warn!(%message, "showing error");
        self.pending.push_back(ErrorDialog {
            message,
            on_dismiss,
        });
    }

    pub fn current(&self) -> Option<&ErrorDialog<T>> {
        self.pending.front()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Removes the visible message and hands back its hook for the caller to
    /// run once it no longer borrows the queue.
    pub fn dismiss(&mut self) -> Option<DismissHook<T>> {
        self.pending.pop_front()?.on_dismiss
    }
}
