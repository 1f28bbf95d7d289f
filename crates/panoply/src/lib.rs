//! # PANOPLY
//!
//! Carried-equipment attachment: tools and shields a player carries are
//! drawn on the player's body, and every other player sees them.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │                              PANOPLY                                  │
//! ├───────────────────────────────────────────────────────────────────────┤
//! │                                                                       │
//! │  ┌──────────────────┐   UpdateMessage    ┌──────────────────┐         │
//! │  │  ServerSession   │ ─────────────────> │  ClientSession   │  x N    │
//! │  │                  │ <───────────────── │                  │         │
//! │  │  • Watchers      │  Request / Config  │  • Renderers     │         │
//! │  │  • Slot policy   │                    │  • Mesh cache    │         │
//! │  └──────────────────┘                    └──────────────────┘         │
//! │                                                                       │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `server`: authoritative session context
//! - `client`: observer session context
//! - `error`: session errors

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod error;
pub mod server;

// Re-export the units
pub use panoply_equipment as equipment;
pub use panoply_networking as networking;
pub use panoply_rendering as rendering;
pub use panoply_shared as shared;

// Re-export commonly used types
pub use client::ClientSession;
pub use error::{SessionError, SessionResult};
pub use server::{ServerSession, TickReport};
