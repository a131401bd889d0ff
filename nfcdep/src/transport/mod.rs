// nfcdep-rs/nfcdep/src/transport/mod.rs

#[cfg(feature = "async")]
pub mod async_traits;
pub mod mock;
pub mod traits;

#[cfg(feature = "async")]
pub use async_traits::AsyncRfTransceiver;
pub use mock::MockTransceiver;
pub use traits::RfTransceiver;
