pub mod codec;
pub mod registry;
pub mod types;
pub mod value;

pub use registry::AbiRegistry;
pub use types::AbiType;
pub use value::{
    unwrap_address, unwrap_biguint, unwrap_bool, unwrap_id_list, unwrap_optional_u64,
    unwrap_text, unwrap_u64, unwrap_u8, TypedValue, ValueError,
};
