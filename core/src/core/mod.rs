pub mod algorithm;
pub mod data_object;
pub mod field_data;
pub mod port;

// Re-export key types for easier access from other rivulet modules (and lib.rs)
pub use algorithm::Algorithm;
pub use data_object::{AsAny, DataHandle, DataObject};
pub use field_data::FieldData;
pub use port::PortInfo;
