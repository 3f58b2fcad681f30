fn main() {
    // Secrets and config overrides are baked into the binary by main.rs
    println!("cargo:rerun-if-env-changed=NETCLOCK_SECRETS");
    println!("cargo:rerun-if-env-changed=NETCLOCK_CONFIG");

    // Host builds (tests, simulation) have no ESP-IDF environment to export.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
