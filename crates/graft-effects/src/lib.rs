//! Graft Effects - production handlers for graft-core traits
//!
//! Currently provides [`DagCborBridge`], the [`IpldBridge`](graft_core::IpldBridge)
//! used on the wire. The in-memory test double lives in `graft-testkit`.

#![forbid(unsafe_code)]

pub mod dag_cbor;

pub use dag_cbor::DagCborBridge;
