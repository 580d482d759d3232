pub mod ai_service; // Vision model seam
pub mod extractor; // Free-text reply -> structured records
pub mod meal_log;
pub mod meal_record; // Log entry assembly
pub mod openrouter; // OpenRouter AI service
pub mod prompts;
pub mod session;

pub use ai_service::VisionModel;
pub use openrouter::OpenRouterService;
pub use session::SessionStore;
