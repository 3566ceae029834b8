//! Connection acceptance and worker dispatch.
//!
//! - **`listener`**: `Server`, the accept loop that hands sockets to the pool
//! - **`pool`**: fixed set of workers, round-robin selection
//! - **`worker`**: one thread per worker, driving a connection through its events
//! - **`tls`**: PEM certificate and key loading

pub mod listener;
pub mod pool;
pub mod tls;
pub mod worker;

pub use listener::Server;
pub use pool::Pool;
pub use worker::{WorkerHandle, WorkerState};
