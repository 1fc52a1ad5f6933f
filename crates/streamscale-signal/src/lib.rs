//! streamscale-signal — inbound scale signals from operators.
//!
//! Operators (or automation) send three signal values — none, scale-out,
//! scale-in — plus a level-triggered "explicit rebalance request" flag.
//! Delivery is a single-slot mailbox: a new signal overwrites the
//! pending one (last write wins), and the scheduling loop reads it
//! non-blockingly. No acknowledgement or delivery guarantee beyond that.
//!
//! The [`SignalServer`] is the small network-facing collaborator that
//! feeds the mailbox from a line-oriented TCP protocol on a fixed port
//! (default 5001).

pub mod mailbox;
pub mod server;

pub use mailbox::{ScaleSignal, SignalMailbox};
pub use server::{Command, DEFAULT_SIGNAL_PORT, SignalServer, parse_command};
