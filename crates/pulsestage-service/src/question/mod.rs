//! Question submission, listing, search and upvotes.

pub mod service;

pub use service::{
    ListQuestionsQuery, QuestionDetail, QuestionService, SubmitQuestionRequest, UpvoteOutcome,
};
