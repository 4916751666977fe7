/// Network adapters for external API calls
mod sendgrid_notifier;

pub use sendgrid_notifier::SendGridNotifier;
