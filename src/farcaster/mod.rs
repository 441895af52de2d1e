pub mod api;
pub mod constants;
pub mod frame;
pub mod schemas;
pub mod typedefs;
