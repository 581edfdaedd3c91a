//! Image host adapters

pub mod http_image_host;

pub use http_image_host::HttpImageHost;
