pub mod passes;
pub mod scanner;
pub mod tokenizer;

pub use scanner::{Pass, PassOutcome, Scanner};
pub use tokenizer::tokenize;
