mod event;
mod state;
mod state_change;

pub use event::*;
pub use raiden_primitives::types::*;
pub use state::*;
pub use state_change::*;
