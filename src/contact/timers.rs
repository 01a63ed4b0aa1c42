//! Timer callbacks for the contact page. A timer can outlive the page that
//! armed it (navigating away while an earlier reset is pending), so these
//! treat disposed reactive values as a no-op.

use leptos::prelude::*;

use super::{ContactController, FormState, NotificationSlot, Relay};

/// Reset timer body: returns the form to idle if `epoch` is still the latest
/// dispatch. Returns false once the page has been unmounted.
pub fn settle_after_reset<R>(
    controller: StoredValue<ContactController<R>>,
    state: WriteSignal<FormState>,
    epoch: u64,
) -> bool
where
    R: Relay + Send + Sync + 'static,
{
    let settled = controller
        .try_with_value(|c| c.settle(epoch))
        .unwrap_or(false);
    if settled {
        state.try_set(FormState::Idle);
    }
    settled
}

/// Dismiss timer body for notice `id`.
pub fn dismiss_after_timeout(notices: RwSignal<NotificationSlot>, id: u64) -> bool {
    notices
        .try_update(|slot| slot.dismiss(id))
        .unwrap_or(false)
}
