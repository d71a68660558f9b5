//! Network nodes: identifiers and per-router state.
//!
//! | Sub-module | Contents |
//! |---|---|
//! | [`id`] | [`NodeId`] newtype |
//! | [`router`] | [`Node`]: processing delay, links, routing table, deliveries |

pub mod id;
pub mod router;

pub use id::NodeId;
pub use router::Node;
