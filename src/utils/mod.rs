pub mod crypto;
pub mod text;
pub mod token;
