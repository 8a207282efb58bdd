pub mod api;
pub mod ballot;
pub mod clock;
pub mod errors;
pub mod identity;
pub mod registry;
pub mod round;
pub mod tally;
