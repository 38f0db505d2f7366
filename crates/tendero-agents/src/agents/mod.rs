pub mod commerce;
pub mod info;
pub mod order_status;
pub mod product;
pub mod support;

pub use commerce::CommerceAgent;
pub use info::InfoAgent;
pub use order_status::OrderStatusAgent;
pub use product::ProductAgent;
pub use support::SupportAgent;
