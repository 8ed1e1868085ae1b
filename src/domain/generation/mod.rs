//! Generation domain - action kinds, prompt templates and answers

mod action;
mod answer;
mod prompt;

pub use action::ActionKind;
pub use answer::{
    error_fragment, Answer, AnswerChunk, AnswerSource, AnswerStream, GenerationRequest,
};
pub use prompt::{PromptTemplate, CONTEXT_SEPARATOR};
