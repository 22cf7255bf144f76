/// Listener settings.
#[derive(Debug, Clone)]
pub struct Config {
    port: u16,
}
