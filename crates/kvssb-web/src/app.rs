use std::cell::Cell;
use std::time::Duration;

use kvssb_core::toast::{Notice, Toast, ToastQueue};
use leptos::prelude::*;

use crate::dom;

/// Handle for showing toasts from event handlers.
#[derive(Clone, Copy)]
pub struct Notifier {
    toasts: RwSignal<ToastQueue>,
    ttl: Duration,
}

impl Notifier {
    /// Show a toast and schedule its removal.
    pub fn show(&self, notice: Notice) {
        let Some(id) = self.toasts.try_update(|queue| queue.push(notice)) else {
            return;
        };
        let toasts = self.toasts;
        dom::after(self.ttl, move || {
            toasts.update(|queue| {
                queue.dismiss(id);
            });
        });
    }
}

thread_local! {
    static NOTIFIER: Cell<Option<Notifier>> = const { Cell::new(None) };
}

/// Mount the toast stack at the end of `<body>`.
pub fn mount_toasts(ttl: Duration) -> Notifier {
    let toasts = RwSignal::new(ToastQueue::default());
    leptos::mount::mount_to_body(move || view! { <ToastHost toasts=toasts/> });
    let notifier = Notifier { toasts, ttl };
    NOTIFIER.with(|slot| slot.set(Some(notifier)));
    notifier
}

/// The mounted toast host, if [`mount_toasts`] has run.
pub fn notifier() -> Option<Notifier> {
    NOTIFIER.with(Cell::get)
}

#[component]
fn ToastHost(toasts: RwSignal<ToastQueue>) -> impl IntoView {
    view! {
        <div class="toast-container">
            <For
                each=move || toasts.with(|queue| queue.toasts().to_vec())
                key=|toast| toast.id
                children=move |toast: Toast| view! { <ToastCard toast=toast toasts=toasts/> }
            />
        </div>
    }
}

#[component]
fn ToastCard(toast: Toast, toasts: RwSignal<ToastQueue>) -> impl IntoView {
    let id = toast.id;

    view! {
        <div class=format!("toast {}", toast.kind)>
            <div class="toast-icon">
                <i class=toast.kind.icon_class()></i>
            </div>
            <div class="toast-message">{toast.message}</div>
            <button
                class="toast-close"
                on:click=move |_| {
                    toasts.update(|queue| {
                        queue.dismiss(id);
                    });
                }
            >
                "×"
            </button>
        </div>
    }
}
