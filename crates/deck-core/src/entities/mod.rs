//! Domain entities - core business objects

mod account;
mod content;
mod device;
mod login_attempt;
mod payment;
mod session;

pub use account::Account;
pub use content::{Chapter, Flashcard, Note, Topic};
pub use device::DeviceLock;
pub use login_attempt::{LoginAttempt, LoginOutcome};
pub use payment::{PaymentApplication, PaymentOrder, PaymentRecord, PAYMENT_STATUS_CAPTURED};
pub use session::SessionRecord;
