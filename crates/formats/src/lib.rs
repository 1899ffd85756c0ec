pub mod feature_collection;
pub mod load;
pub mod properties;

pub use feature_collection::*;
pub use load::*;
pub use properties::*;
