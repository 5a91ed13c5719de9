//! Conversational action-flow state machine
//!
//! Pure state transitions: `(state, context, event) -> (state', effects)`.
//! The runtime executes the effects.

mod effect;
pub mod event;
pub mod parse;
pub mod replies;
pub mod state;
pub(crate) mod transition;


pub use effect::Effect;
pub use event::Event;
pub use state::{ChatState, Credential, FlowState, SessionContext};
pub use transition::{transition, TransitionError};
