pub mod protocol;
pub mod connection;

#[cfg(feature = "net")]
pub mod client;
