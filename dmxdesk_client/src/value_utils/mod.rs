//! Pure helpers shared by the engine components. Nothing in here holds state
//! beyond the timer slots, which are driven by explicit timestamps.

pub mod color;
pub mod scaling;
pub mod timer;
