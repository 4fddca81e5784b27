pub mod activity_service;
pub mod extraction_service;
pub mod hash_service;
pub mod id_service;
pub mod metrics_service;
pub mod motion_service;
pub mod ocr_service;
pub mod streak_service;
pub mod validation_service;
