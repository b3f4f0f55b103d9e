pub mod allocation;
pub mod capability;
pub mod taxonomy;
