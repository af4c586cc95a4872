pub mod gauge;
pub mod trend;

pub use gauge::GaugeWidget;
pub use trend::TrendChart;
