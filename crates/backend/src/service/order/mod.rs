mod command;
mod pricing;

pub use self::command::OrderCommandService;
pub use self::pricing::calculate_total_price;
