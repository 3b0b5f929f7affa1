pub mod cd;
pub mod chain;
pub mod cue;
pub mod error;
pub mod sheet;
pub mod time;
pub mod tools;
