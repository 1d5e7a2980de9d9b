fn main() {
    // Host builds (tests, property runs) never link against ESP-IDF.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
