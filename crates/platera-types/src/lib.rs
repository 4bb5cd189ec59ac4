//! Shared data types for the Platera API layer.
//!
//! Everything here is plain data: roles, the user profile, token payloads,
//! restaurant records and the list-envelope parser used at the client boundary.

pub mod envelope;
pub mod lenient;
pub mod records;
pub mod role;
pub mod user;

pub use envelope::{ListEnvelope, Page};
pub use records::{
    InventoryItem, MenuCategory, MenuItem, Notification, Order, OrderItem, OrderStatus, Product,
    Recipe, Reservation, ReservationStatus, Shift, StaffMember, StockMovement, Supplier, Table,
    TableStatus,
};
pub use role::Role;
pub use user::{LoginResponse, RefreshResponse, UserProfile};
