pub mod opcode;
pub mod tape;
pub mod resource;
pub mod registers;
pub mod entropy;
pub mod replication;
pub mod interpreter;
pub mod report;
pub mod metrics;
pub mod config;
