pub mod orca;
