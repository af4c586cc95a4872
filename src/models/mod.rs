pub mod classification;
pub mod feed;
pub mod policy;
pub mod reading;
pub mod sun;

pub use classification::*;
pub use feed::*;
pub use policy::*;
pub use reading::*;
pub use sun::*;
