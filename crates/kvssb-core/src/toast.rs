use std::fmt;
use std::time::Duration;

/// How long a toast stays up before removing itself
pub const TOAST_TTL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

impl ToastKind {
    /// Unrecognised kinds fall back to info.
    pub fn parse(kind: &str) -> Self {
        match kind {
            "success" => ToastKind::Success,
            "error" => ToastKind::Error,
            "warning" => ToastKind::Warning,
            _ => ToastKind::Info,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Warning => "warning",
            ToastKind::Info => "info",
        }
    }

    /// Font Awesome icon shown beside the message
    pub fn icon_class(self) -> &'static str {
        match self {
            ToastKind::Success => "fas fa-check-circle",
            ToastKind::Error => "fas fa-exclamation-circle",
            ToastKind::Warning => "fas fa-exclamation-triangle",
            ToastKind::Info => "fas fa-info-circle",
        }
    }
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message waiting to be shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub kind: ToastKind,
}

impl Notice {
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Build a notice from a kind name such as `"success"`; unknown names
    /// show as info.
    pub fn named(message: impl Into<String>, kind: &str) -> Self {
        Self::new(message, ToastKind::parse(kind))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
}

/// Toasts currently on screen, oldest first.
#[derive(Debug, Clone, Default)]
pub struct ToastQueue {
    next_id: u64,
    toasts: Vec<Toast>,
}

impl ToastQueue {
    /// Show a notice. Returns the toast's id for later dismissal.
    pub fn push(&mut self, notice: Notice) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push(Toast {
            id,
            message: notice.message,
            kind: notice.kind,
        });
        id
    }

    /// Remove a toast. Dismissing one that's already gone is a no-op.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != id);
        self.toasts.len() != before
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_defaults_to_info() {
        assert_eq!(ToastKind::parse("success"), ToastKind::Success);
        assert_eq!(ToastKind::parse("warning"), ToastKind::Warning);
        assert_eq!(ToastKind::parse("bogus"), ToastKind::Info);
        assert_eq!(ToastKind::parse(""), ToastKind::Info);

        let notice = Notice::named("Saved", "error");
        assert_eq!(notice.kind, ToastKind::Error);
        assert_eq!(Notice::named("Hi", "loud").kind, ToastKind::Info);
    }

    #[test]
    fn test_icons() {
        assert_eq!(ToastKind::Success.icon_class(), "fas fa-check-circle");
        assert_eq!(ToastKind::Error.icon_class(), "fas fa-exclamation-circle");
        assert_eq!(ToastKind::Warning.icon_class(), "fas fa-exclamation-triangle");
        assert_eq!(ToastKind::default().icon_class(), "fas fa-info-circle");
    }

    #[test]
    fn test_queue_push_and_dismiss() {
        let mut queue = ToastQueue::default();
        let first = queue.push(Notice::new("one", ToastKind::Success));
        let second = queue.push(Notice::new("two", ToastKind::Info));
        assert_ne!(first, second);
        assert_eq!(queue.len(), 2);

        assert!(queue.dismiss(first));
        assert!(!queue.dismiss(first));
        assert_eq!(queue.toasts()[0].message, "two");

        // closed by hand, then the timer fires
        assert!(queue.dismiss(second));
        assert!(!queue.dismiss(second));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut queue = ToastQueue::default();
        let id = queue.push(Notice::new("a", ToastKind::Info));
        queue.dismiss(id);
        assert_ne!(queue.push(Notice::new("b", ToastKind::Info)), id);
    }
}
