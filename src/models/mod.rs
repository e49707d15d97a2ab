pub mod alert;
pub mod enums;
pub mod medication;
pub mod patient;
pub mod validation;

pub use alert::*;
pub use enums::*;
pub use medication::*;
pub use patient::*;
pub use validation::*;
