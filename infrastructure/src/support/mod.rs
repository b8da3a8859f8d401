//! Support agent service adapter
//!
//! Implements AgentGateway against the service's REST and WebSocket planes.

pub mod gateway;
pub mod protocol;
pub mod rest;
pub mod socket;
