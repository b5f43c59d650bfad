pub mod block;
pub mod category;
pub mod trial;

pub use block::{BlockKind, BlockSpec, CriticalPair, Side};
pub use category::{CategoryId, StimulusCategory};
pub use trial::{Response, Trial};
