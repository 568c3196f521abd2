pub mod detector;
pub mod storage;
