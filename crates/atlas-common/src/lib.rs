pub mod category;
pub mod config;
pub mod denoise;
pub mod error;
pub mod model;
pub mod store;
pub mod text;
pub mod translate;
