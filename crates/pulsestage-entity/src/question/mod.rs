//! Question domain entities.

pub mod model;
pub mod status;
pub mod upvote;

pub use model::{CreateQuestion, MAX_BODY_CHARS, Question};
pub use status::QuestionStatus;
pub use upvote::Upvote;
