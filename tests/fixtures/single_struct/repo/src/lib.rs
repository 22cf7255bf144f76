/// Listener settings.
#[derive(Debug, Clone)]
struct Config {
    port: u16,
}
