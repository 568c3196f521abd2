pub mod detector;
pub mod file_service;
pub mod renderer;
pub mod storage;
