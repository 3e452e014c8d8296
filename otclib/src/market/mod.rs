pub mod objects;
pub use objects::*;

pub mod random;
pub use random::*;

pub mod generator;
pub use generator::*;

pub mod signal;
pub use signal::*;

pub mod simulation;
pub use simulation::*;
