pub mod formatting;
pub mod system;
