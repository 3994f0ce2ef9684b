pub mod etl;
pub mod export;
pub mod graphql;
pub mod html;
pub mod http;
pub mod sitemap;
pub mod summary;

pub use crate::domain::model::{Record, TransformResult};
pub use crate::domain::ports::{Pipeline, Storage};
pub use crate::utils::error::Result;
