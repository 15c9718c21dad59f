//! Feedback mail relay: testimonial form → Resend

mod feedback;
mod resend;
mod settings;

pub use feedback::{escape_html, FeedbackForm, OutgoingEmail};
pub use resend::{MailError, MailSender, ResendClient};
pub use settings::{MailDiagnostics, MailSettings, DEFAULT_FROM};
