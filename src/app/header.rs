use leptos::prelude::*;
use leptos_router::hooks::use_location;

#[component]
pub fn Header() -> impl IntoView {
    let pathname = use_location().pathname;
    let on_contact = move || {
        let path = pathname.get();
        path == "/" || path.starts_with("/contact")
    };

    view! {
        <header class="bg-gray-800 shadow">
            <div class="mx-auto px-4 sm:px-6 lg:px-8 py-4">
                <div class="flex items-center justify-between">
                    <h1 class="text-2xl font-bold">
                        <span class="text-green-500">"➜"</span>
                        " "
                        <span class="text-teal-400">"portfolio"</span>
                        " "
                        <span class="text-blue-400">
                            <span>"git:("</span>
                            <span class="text-red-500">"main"</span>
                            <span>")"</span>
                        </span>
                    </h1>
                    <nav>
                        <a
                            href="/contact"
                            class=move || {
                                if on_contact() {
                                    "text-cyan font-bold"
                                } else {
                                    "text-muted hover:text-cyan"
                                }
                            }
                        >
                            "contact"
                        </a>
                    </nav>
                </div>
            </div>
        </header>
    }
}
