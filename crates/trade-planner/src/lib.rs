pub mod composer;
pub mod entry;
pub mod models;
pub mod risk_reward;
#[cfg(test)]
mod tests;

pub use composer::compose_signal;
pub use entry::decide_entry;
pub use models::*;
pub use risk_reward::{plan_risk_reward, DEFAULT_ACCOUNT_RISK_PERCENT};
