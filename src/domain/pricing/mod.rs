pub mod fair_price;
pub mod quote;
pub mod surge;

pub use fair_price::FarePolicy;
pub use quote::FareQuote;
pub use surge::SurgePolicy;
