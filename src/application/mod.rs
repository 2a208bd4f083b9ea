pub mod book;
mod dependencies;
pub mod loan;
pub mod notification;

pub use dependencies::ServiceDependencies;
