pub mod helpers;
pub mod mocks;

mod orders;
mod payments;
