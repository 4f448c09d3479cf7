mod generator;

pub use generator::{AnswerGenerator, OllamaClient};
