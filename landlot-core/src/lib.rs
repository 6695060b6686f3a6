#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod entities;
pub mod events;
pub mod framework;
pub mod messaging;
pub mod payments;
pub mod processors;
pub mod stores;
pub mod testing;
