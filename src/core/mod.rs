//! Process-wide state and shutdown handling.

mod state;

pub use state::{
    is_healthy, is_launched, is_shutdown, register_shutdown_tx, set_healthy, set_launched,
    setup_shutdown_handler,
};
