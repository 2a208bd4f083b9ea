pub mod book;
pub mod loan;
pub mod pagination;
pub mod value_objects;

pub use book::*;
pub use loan::*;
pub use pagination::*;
pub use value_objects::*;
