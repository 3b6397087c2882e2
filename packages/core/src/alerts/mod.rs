//! Drop notification delivery.

pub mod email;
pub mod mock;
pub mod notifier;

pub use email::SmtpNotifier;
pub use notifier::Notifier;
