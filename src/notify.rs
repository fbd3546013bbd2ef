use crate::SideEffectError;

/// the OS-popup boundary. whether a popup actually appears is this
/// collaborator's business (user preference, OS permission); the scheduler
/// just reports that an alarm fired.
pub trait Notifier {
    fn show(&mut self, title: &str, body: &str) -> Result<(), SideEffectError>;
}

/// notifier that records through the log instead of a desktop popup;
/// the host shell owns real popup plumbing. disabled means silently dropped.
#[derive(Debug, Clone, Copy)]
pub struct LogNotifier {
    enabled: bool,
}

impl LogNotifier {
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Notifier for LogNotifier {
    fn show(&mut self, title: &str, body: &str) -> Result<(), SideEffectError> {
        if self.enabled {
            log::info!("notification: {title}: {body}");
        }
        Ok(())
    }
}
