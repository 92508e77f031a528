pub mod turn;

pub use turn::{HeadingReader, TurnController, TurnOutcome, TurnPhase};
