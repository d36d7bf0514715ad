pub mod assistant;
pub mod delivery;
pub mod order;
pub mod outcome;
pub mod text_gen;

pub use assistant::Assistant;
pub use delivery::DeliveryService;
pub use order::{DeliveryLocation, Order, OrderRequest};
pub use outcome::ToolResult;
pub use text_gen::{GemmaClient, TextGenerator};
