pub mod balance;
pub mod cache;
pub mod discovery;
pub mod position;
pub mod quoter;
#[allow(clippy::module_inception)]
pub mod tracker;

pub use balance::fetch_assets_balance_in_usd;
pub use cache::MetadataCache;
pub use discovery::{discover, fetch_all};
pub use position::PositionValuator;
pub use quoter::{UsdQuoter, STABLECOIN_SYMBOLS};
pub use tracker::Tracker;
