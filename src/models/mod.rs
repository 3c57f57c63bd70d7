mod position;
mod report;
mod token;

pub use position::{
    PositionFees, PositionLiquidity, PositionPrices, PositionTokens, PositionValuation,
    RawPosition,
};
pub use report::{NetworkReport, PositionReport, TrackingReport};
pub use token::TokenInfo;
