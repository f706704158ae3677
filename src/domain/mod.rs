pub mod article;
pub mod resource;
pub mod response;

pub use article::{Article, Source};
pub use resource::Resource;
pub use response::NewsResponse;
