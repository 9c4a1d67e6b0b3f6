pub mod error;
pub mod external;
pub mod journal;
pub mod outcome;
pub mod runner;
