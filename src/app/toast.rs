use leptos::prelude::*;

use crate::contact::NotificationSlot;

/// Renders whatever notice currently occupies the slot.
#[component]
pub fn Toast(slot: RwSignal<NotificationSlot>) -> impl IntoView {
    move || {
        slot.with(|s| s.current().cloned()).map(|notice| {
            view! {
                <div
                    class=format!("form-notification {}", notice.kind.class())
                    role="status"
                    aria-live="polite"
                >
                    <div class="notification-content">
                        <span class="notification-icon">{notice.kind.icon()}</span>
                        <span>{notice.message}</span>
                    </div>
                </div>
            }
        })
    }
}
