pub mod observer;
pub mod registry;
pub mod remote;
pub mod sync;
pub mod value;
pub mod wire;
