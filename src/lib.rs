pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod finder;
pub mod pool;
pub mod presentation;
pub mod probe;
pub mod runner;
pub mod scan;
pub mod session;
pub mod timer;
pub mod tasks {
    pub mod show;
}
