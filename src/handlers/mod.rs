pub mod meal_handler;
pub mod profile;
pub mod session_sweeper;

pub use meal_handler::MealHandler;
pub use session_sweeper::SessionSweeper;
