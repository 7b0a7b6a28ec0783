use tracing::{error, info};

/// Hook into the UI-messaging component. The gateway decides *when* a
/// success or error toast should appear; rendering belongs to the
/// implementor.
pub trait Notifier: Send + Sync {
    fn show_success(&self, message: &str);
    fn show_error(&self, message: &str);
}

/// Default notifier that routes messages to the log. Useful for headless
/// consumers and tests; UI frontends supply their own implementation.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show_success(&self, message: &str) {
        info!("{}", message);
    }

    fn show_error(&self, message: &str) {
        error!("{}", message);
    }
}
