//! Everything that talks to the X-Server

pub(crate) mod screen;
pub(crate) mod utils;
pub(crate) mod xconnection;
