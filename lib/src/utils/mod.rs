pub mod ballot;
pub mod candidate;
