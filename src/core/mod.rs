pub mod fetcher;
pub mod provider;
pub mod retry;

pub use crate::domain::model::{BoundingBox, DemType, FetchReport, FetchRequest};
pub use crate::domain::ports::{Delay, StagedWrite, Storage};
pub use crate::utils::error::Result;
