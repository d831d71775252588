pub mod ingredient;
pub mod interaction;
pub mod routine;
