//! Form handlers. Nothing is sent anywhere; submissions are logged and
//! acknowledged with a toast.

use std::collections::BTreeMap;
use tracing::info;

use crate::toast::{Notice, ToastKind};

pub const CONTACT_THANKS: &str = "Thank you for your message! We will get back to you soon.";
pub const CV_PLACEHOLDER: &str = "CV download would start here in a real implementation";

/// Collect form fields into a map. A repeated name keeps its last value.
pub fn collect_fields<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> BTreeMap<String, String>
where
    K: Into<String>,
    V: Into<String>,
{
    fields
        .into_iter()
        .map(|(name, value)| (name.into(), value.into()))
        .collect()
}

/// Contact form submitted.
pub fn contact_submitted(fields: &BTreeMap<String, String>) -> Notice {
    info!(?fields, "contact form submitted");
    Notice::new(CONTACT_THANKS, ToastKind::Success)
}

/// Newsletter form submitted. An empty address is ignored.
pub fn newsletter_submitted(email: &str) -> Option<Notice> {
    if email.is_empty() {
        return None;
    }
    info!(email, "newsletter signup");
    Some(Notice::new(
        format!("Thank you for subscribing with {email}!"),
        ToastKind::Success,
    ))
}

pub fn cv_download_requested() -> Notice {
    Notice::new(CV_PLACEHOLDER, ToastKind::Info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_fields_last_value_wins() {
        let fields = collect_fields([("name", "Ada"), ("topic", "a"), ("topic", "b")]);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["topic"], "b");
    }

    #[test]
    fn test_contact_notice() {
        let notice = contact_submitted(&collect_fields([("email", "ada@example.com")]));
        assert_eq!(notice.kind, ToastKind::Success);
        assert_eq!(notice.message, CONTACT_THANKS);
    }

    #[test]
    fn test_newsletter() {
        assert_eq!(newsletter_submitted(""), None);
        let notice = newsletter_submitted("ada@example.com").unwrap();
        assert_eq!(notice.message, "Thank you for subscribing with ada@example.com!");
        assert_eq!(notice.kind, ToastKind::Success);
    }

    #[test]
    fn test_cv_download() {
        assert_eq!(cv_download_requested().kind, ToastKind::Info);
    }
}
