pub mod bigint;
pub mod blind_signature;
pub mod communication;
pub mod envelope;
pub mod error;
