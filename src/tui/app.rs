mod menu;
mod state;

pub use state::{AppState, ClaimDraft, InputAction, Scene};
