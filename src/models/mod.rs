pub mod order;
pub mod product;
pub mod user;

pub use order::{
    DeliveryAddress, EscrowStatus, Order, OrderItem, OrderStatus, PaymentMethod, StatusEntry,
};
pub use product::Product;
pub use user::{AuthContext, Role};
