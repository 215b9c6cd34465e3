pub mod feature;
pub mod kv_entry;

pub use feature::Entity as Feature;
pub use kv_entry::Entity as KvEntry;
