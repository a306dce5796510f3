//! Stash gRPC Protocol Definitions
//!
//! This crate contains the generated gRPC code for the stash key-value
//! service.

/// Generated protobuf/gRPC code
pub mod stash {
    tonic::include_proto!("stash");
}

pub use stash::*;
