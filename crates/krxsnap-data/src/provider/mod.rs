//! 원격 데이터 제공자.

pub mod kofia;
pub mod krx;

pub use kofia::KofiaClient;
pub use krx::{KrxClient, KrxClientConfig};
