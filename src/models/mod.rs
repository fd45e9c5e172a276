pub mod candidate;
pub mod company;
pub mod counters;
pub mod user;
