pub mod actors;
pub mod clock;
pub mod errors;
pub mod events;
pub mod execution;
pub mod fifo;
pub mod report;
pub mod restaurant;
pub mod schedule;
pub mod signals;
pub mod types;
pub mod world;

#[cfg(test)]
mod tests;
