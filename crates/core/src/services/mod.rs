pub mod chart_service;
pub mod detail_service;
pub mod image_service;
pub mod market_service;
pub mod pipeline;
