//! Domain models shared by stores, services and handlers.

pub mod cart;
pub mod category;
pub mod product;
pub mod session;
pub mod user;

pub use cart::{Cart, CartItem};
pub use category::Category;
pub use product::{NewProduct, Product, ProductCard};
pub use session::{SessionId, SessionUser};
pub use user::User;
