pub mod bindings;
pub mod protocol;
