pub mod ladder_gen;
pub mod projector;
pub mod settlement;
pub mod tick_schedule;

pub use ladder_gen::PriceLadderGenerator;
pub use projector::ResultProjector;
pub use settlement::{RoiPolicy, SettlementCalculator};
pub use tick_schedule::{TickBand, TickSchedule};
