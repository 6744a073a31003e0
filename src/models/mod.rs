pub mod price;
pub mod trade;

pub use price::{quote, Price};
pub use trade::{
    Direction, SettlementResult, SettlementRow, TradeParameters, TradeParametersInput, TradeType,
};
