pub mod gauge;

pub use gauge::{et0_gauge, moisture_gauge, ndvi_gauge, rain_gauge};
