mod rsi;
mod tsi;

pub use rsi::rsi;
pub use tsi::tsi;
