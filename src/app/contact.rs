use leptos::{either::Either, ev::SubmitEvent, html, prelude::*, task::spawn_local};
use leptos_meta::Title;
use leptos_use::{use_timeout_fn, UseTimeoutFnReturn};

use super::toast::Toast;
use crate::{
    config::ContactConfig,
    contact::{
        controller::RESET_DELAY,
        keeps_focus_style,
        notice::NOTICE_TIMEOUT,
        relay::EmailJsRelay,
        timers::{dismiss_after_timeout, settle_after_reset},
        CharCount, ContactController, ContactFields, FormState, Notice, NotificationSlot,
        Service, SubmitOutcome,
    },
};

type SiteController = ContactController<EmailJsRelay>;

fn site_controller() -> SiteController {
    let config = ContactConfig::from_build_env();
    // the server warns once at startup
    #[cfg(feature = "hydrate")]
    if let Err(e) = config.validate() {
        log::warn!("contact form relay is not configured: {}", e);
    }
    let relay = EmailJsRelay::new(config.endpoint.clone());
    ContactController::new(config, relay)
}

/// Focus tracking for one `.form-group`. Blur keeps the style while the
/// field holds text.
#[derive(Clone, Copy)]
struct GroupFocus(RwSignal<bool>);

impl GroupFocus {
    fn new() -> Self {
        Self(RwSignal::new(false))
    }

    fn focus(&self) {
        self.0.set(true);
    }

    fn blur(&self, value: &str) {
        self.0.set(keeps_focus_style(value));
    }

    fn clear(&self) {
        self.0.try_set(false);
    }

    fn get(&self) -> bool {
        self.0.get()
    }
}

fn button_icon(state: FormState) -> &'static str {
    match state {
        FormState::Success => "✔",
        FormState::Error => "⚠",
        _ => "➤",
    }
}

#[component]
pub fn ContactPage() -> impl IntoView {
    let controller = StoredValue::new(site_controller());
    let (state, set_state) = signal(FormState::Idle);
    let notices = RwSignal::new(NotificationSlot::new());
    let (char_count, set_char_count) = signal(None::<CharCount>);

    let focus = [(); 6].map(|_| GroupFocus::new());
    let [name_focus, email_focus, company_focus, service_focus, subject_focus, message_focus] =
        focus;

    let name_ref = NodeRef::<html::Input>::new();
    let email_ref = NodeRef::<html::Input>::new();
    let company_ref = NodeRef::<html::Input>::new();
    let service_ref = NodeRef::<html::Select>::new();
    let subject_ref = NodeRef::<html::Input>::new();
    let message_ref = NodeRef::<html::Textarea>::new();

    let UseTimeoutFnReturn {
        start: start_reset, ..
    } = use_timeout_fn(
        move |epoch: u64| {
            settle_after_reset(controller, set_state, epoch);
        },
        RESET_DELAY.as_millis() as f64,
    );

    let UseTimeoutFnReturn {
        start: start_dismiss,
        ..
    } = use_timeout_fn(
        move |id: u64| {
            dismiss_after_timeout(notices, id);
        },
        NOTICE_TIMEOUT.as_millis() as f64,
    );

    let notify = move |notice: Notice| {
        if let Some(id) = notices.try_update(|slot| slot.show(notice)) {
            start_dismiss(id);
        }
    };

    let read_fields = move || ContactFields {
        name: name_ref.get_untracked().map(|el| el.value()).unwrap_or_default(),
        email: email_ref.get_untracked().map(|el| el.value()).unwrap_or_default(),
        subject: subject_ref.get_untracked().map(|el| el.value()).unwrap_or_default(),
        message: message_ref.get_untracked().map(|el| el.value()).unwrap_or_default(),
        company: company_ref.get_untracked().map(|el| el.value()).unwrap_or_default(),
        service: service_ref.get_untracked().map(|el| el.value()).unwrap_or_default(),
    };

    let write_fields = move |fields: &ContactFields| {
        if let Some(el) = name_ref.get_untracked() {
            el.set_value(&fields.name);
        }
        if let Some(el) = email_ref.get_untracked() {
            el.set_value(&fields.email);
        }
        if let Some(el) = subject_ref.get_untracked() {
            el.set_value(&fields.subject);
        }
        if let Some(el) = message_ref.get_untracked() {
            el.set_value(&fields.message);
        }
        if let Some(el) = company_ref.get_untracked() {
            el.set_value(&fields.company);
        }
        if let Some(el) = service_ref.get_untracked() {
            el.set_value(&fields.service);
        }
    };

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let ctrl = controller.get_value();
        let dispatch = match ctrl.begin(read_fields()) {
            Ok(Some(dispatch)) => dispatch,
            // already sending
            Ok(None) => return,
            Err(err) => {
                notify(Notice::error(err.to_string()));
                return;
            }
        };
        set_state(FormState::Loading);

        let notify = notify.clone();
        let start_reset = start_reset.clone();
        spawn_local(async move {
            let outcome = ctrl.deliver(dispatch).await;
            set_state.try_set(ctrl.state());
            if let SubmitOutcome::Delivered { .. } = outcome {
                write_fields(&ctrl.fields());
                set_char_count.try_set(None);
                for group in focus {
                    group.clear();
                }
            }
            if let Some(notice) = outcome.notice() {
                notify(notice);
            }
            if let Some(epoch) = outcome.epoch() {
                start_reset(epoch);
            }
        });
    };

    let input_class = "w-full px-4 py-2 rounded-md border border-muted focus:outline-none focus:ring-2 focus:ring-cyan focus:border-cyan bg-background text-foreground placeholder-muted transition-all duration-200";

    view! {
        <Title text="Contact" />
        <div class="w-full max-w-2xl mx-auto page-content">
            <h1 class="text-2xl my-8 text-center font-bold section-content">"Get In Touch"</h1>
            <p class="text-base mb-6 text-center text-muted">
                "Have a project in mind or just want to say hi? Send a message and I'll get back to you."
            </p>
            <form id="contact-form" class="flex flex-col gap-4" on:submit=on_submit novalidate=true>
                <div class="grid grid-cols-1 sm:grid-cols-2 gap-4">
                    <div class="form-group" class:focused=move || name_focus.get()>
                        <label for="name" class="font-medium text-cyan">"Name"</label>
                        <input
                            id="name"
                            node_ref=name_ref
                            type="text"
                            class=input_class
                            placeholder="Your name"
                            on:focus=move |_| name_focus.focus()
                            on:blur=move |ev| name_focus.blur(&event_target_value(&ev))
                        />
                    </div>
                    <div class="form-group" class:focused=move || email_focus.get()>
                        <label for="email" class="font-medium text-cyan">"Email"</label>
                        <input
                            id="email"
                            node_ref=email_ref
                            type="email"
                            class=input_class
                            placeholder="you@example.com"
                            on:focus=move |_| email_focus.focus()
                            on:blur=move |ev| email_focus.blur(&event_target_value(&ev))
                        />
                    </div>
                </div>
                <div class="grid grid-cols-1 sm:grid-cols-2 gap-4">
                    <div class="form-group" class:focused=move || company_focus.get()>
                        <label for="company" class="font-medium text-cyan">"Company (optional)"</label>
                        <input
                            id="company"
                            node_ref=company_ref
                            type="text"
                            class=input_class
                            placeholder="Where you work"
                            on:focus=move |_| company_focus.focus()
                            on:blur=move |ev| company_focus.blur(&event_target_value(&ev))
                        />
                    </div>
                    <div class="form-group" class:focused=move || service_focus.get()>
                        <label for="service" class="font-medium text-cyan">"Service (optional)"</label>
                        <select
                            id="service"
                            node_ref=service_ref
                            class=input_class
                            on:focus=move |_| service_focus.focus()
                            on:blur=move |ev| service_focus.blur(&event_target_value(&ev))
                        >
                            <option value="">"Select a service"</option>
                            {Service::all()
                                .into_iter()
                                .map(|s| view! { <option value=s.value()>{s.name()}</option> })
                                .collect_view()}
                        </select>
                    </div>
                </div>
                <div class="form-group" class:focused=move || subject_focus.get()>
                    <label for="subject" class="font-medium text-cyan">"Subject"</label>
                    <input
                        id="subject"
                        node_ref=subject_ref
                        type="text"
                        class=input_class
                        placeholder="What's this about?"
                        on:focus=move |_| subject_focus.focus()
                        on:blur=move |ev| subject_focus.blur(&event_target_value(&ev))
                    />
                </div>
                <div class="form-group" class:focused=move || message_focus.get()>
                    <label for="message" class="font-medium text-cyan">"Message"</label>
                    <textarea
                        id="message"
                        node_ref=message_ref
                        rows="6"
                        class=input_class
                        placeholder="Your message"
                        on:focus=move |_| message_focus.focus()
                        on:blur=move |ev| message_focus.blur(&event_target_value(&ev))
                        on:input=move |ev| {
                            set_char_count(Some(CharCount::of(&event_target_value(&ev))));
                        }
                    ></textarea>
                    {move || {
                        char_count()
                            .map(|count| {
                                view! {
                                    <div
                                        class="char-counter"
                                        class:char-counter-warn=count.is_near_limit()
                                    >
                                        {count.to_string()}
                                    </div>
                                }
                            })
                    }}
                </div>
                <button
                    id="button"
                    type="submit"
                    class=move || {
                        format!(
                            "flex items-center justify-center gap-2 px-6 py-3 rounded-md font-medium bg-cyan/20 hover:bg-cyan/30 text-cyan border border-cyan/30 transition-all duration-200 {}",
                            state().button_class(),
                        )
                    }
                    disabled=move || state() == FormState::Loading
                >
                    {move || {
                        let current = state();
                        if current == FormState::Loading {
                            Either::Left(view! { <span class="loading-spinner"></span> })
                        } else {
                            Either::Right(view! { <span>{button_icon(current)}</span> })
                        }
                    }}
                    <span>{move || state().button_label()}</span>
                </button>
            </form>
            <Toast slot=notices />
        </div>
    }
}
