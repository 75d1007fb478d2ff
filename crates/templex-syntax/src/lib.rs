pub mod error;
pub mod grammar;
pub mod statement;
pub mod token;

pub use error::*;
pub use grammar::*;
pub use statement::*;
pub use token::*;
