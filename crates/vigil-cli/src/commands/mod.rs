pub mod dispatch;
pub mod export;
pub mod feed;
pub mod findings;
pub mod investigation;
pub mod risk;
pub mod shared;
