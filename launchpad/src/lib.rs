pub mod cli;
pub mod pause;
pub mod pipeline;
