fn main() {
    // Relay settings are baked into the WASM bundle through option_env!
    for var in [
        "EMAILJS_SERVICE_ID",
        "EMAILJS_TEMPLATE_ID",
        "EMAILJS_PUBLIC_KEY",
        "EMAILJS_ENDPOINT",
        "CONTACT_RECIPIENT_NAME",
    ] {
        println!("cargo:rerun-if-env-changed={}", var);
    }

    // Rerun if build.rs changes
    println!("cargo:rerun-if-changed=build.rs");
}
