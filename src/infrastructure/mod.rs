pub mod staging;
pub mod status;
pub mod storage;
pub mod transcode;
