//! Client-side pieces of the quiz flow: the configuration form, the topic
//! catalogue, progress display and an HTTP-backed generator.

pub mod api;
pub mod form;
pub mod progress;
pub mod topics;

pub use api::HttpQuizClient;
pub use form::{ConfigForm, FormAction, SubmitOutcome, TimeSyncPolicy};
pub use progress::Progress;
