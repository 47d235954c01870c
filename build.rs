fn main() {
    println!("cargo:rerun-if-env-changed=PARKBAY_CONFIG");

    // Host builds (tests, simulation) have no ESP-IDF environment to export.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
