//! # Hardware Interface
//!
//! Defines the interface between the controller executable and the arm
//! hardware server: the messages exchanged over the network and the socket
//! abstraction used to exchange them.
//!
//! The hardware server itself is not part of this workspace, only the
//! contract spoken to it.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod arm;
pub mod net;
