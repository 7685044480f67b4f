//! Pipeline module - service layer for the provision / train / teardown sequence

mod provision;
pub(crate) mod service;
mod teardown;
mod train;

pub use service::LustrePipelineService;
