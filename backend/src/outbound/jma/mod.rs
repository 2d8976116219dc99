//! Forecast documents from the JMA bosai endpoint.

mod http_source;

pub use http_source::JmaForecastSource;
