pub mod oscillator;
pub mod price;
pub mod trend;

pub use oscillator::{rsi, tsi};
pub use price::{daily_returns, hl_ratio, oc_ratio};
pub use trend::ema;
