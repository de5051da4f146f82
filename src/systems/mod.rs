mod infection;
mod marketplace;
mod movement;
mod progression;
mod stats;
mod travel;

pub use infection::InfectionSystem;
pub use marketplace::MarketplaceSystem;
pub use movement::MovementSystem;
pub use progression::ProgressionSystem;
pub use stats::StatsSystem;
pub use travel::TravelSystem;
