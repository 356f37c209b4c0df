mod channel;
pub mod factories;
