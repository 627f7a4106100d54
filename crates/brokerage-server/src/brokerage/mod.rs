//! Brokerage House server.
//!
//! - `server`: listener, accept loop and shutdown
//! - `worker`: one task per connection running request/reply

mod server;
mod worker;

pub use server::{run, serve};
