pub mod storage_service;
pub mod token_service;
