//! Market Exchange emulator server.
//!
//! - `server`: listener and wiring
//! - `worker`: one reader task per Brokerage House connection
//! - `engine_task`: the single task owning the exchange state
//! - `forwarder`: runs the exchange's transactions against the Brokerage House

mod engine_task;
mod forwarder;
mod server;
mod worker;

pub use server::{run, serve};
