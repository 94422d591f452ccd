//! The four REST resources and their shared handlers

pub mod gear;
pub mod handlers;
pub mod hiker;
pub mod trail;
pub mod wildlife;

pub use gear::GearItems;
pub use handlers::{create_record, delete_record, get_record, list_records, update_record};
pub use hiker::Hikers;
pub use trail::Trails;
pub use wildlife::Wildlife;
