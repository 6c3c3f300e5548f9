pub mod bootstrap;

pub use bootstrap::{DatabaseOutcome, bootstrap};
