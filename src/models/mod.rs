pub mod document;
pub mod outcome;
pub mod user;
