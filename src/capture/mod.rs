// Pipeline wiring — slots, the wiring procedure, and the session owner.

pub mod controller;
pub mod slot;
pub mod wiring;
