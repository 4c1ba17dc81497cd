pub mod timing;
pub mod validation;

pub use timing::QuizPolicy;
pub use validation::{validate, ConfigInput, ValidationError};
