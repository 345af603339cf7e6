pub mod user;
pub mod verification_code;
pub mod category;
pub mod brand;
pub mod product;
pub mod product_review;
pub mod attribute;
pub mod product_attribute;
pub mod cart;
pub mod favourite;
pub mod order;
pub mod order_item;
pub mod payment;
pub mod payment_item;

pub use user::Entity as User;
pub use verification_code::Entity as VerificationCode;
pub use category::Entity as Category;
pub use brand::Entity as Brand;
pub use product::Entity as Product;
pub use product_review::Entity as ProductReview;
pub use attribute::Entity as Attribute;
pub use product_attribute::Entity as ProductAttribute;
pub use cart::Entity as Cart;
pub use favourite::Entity as Favourite;
pub use order::Entity as Order;
pub use order_item::Entity as OrderItem;
pub use payment::Entity as Payment;
pub use payment_item::Entity as PaymentItem;
