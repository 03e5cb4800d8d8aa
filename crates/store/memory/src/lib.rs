mod images;
mod policies;
mod wires;

pub use images::MemoryImageStore;
pub use policies::MemoryPolicyStore;
pub use wires::MemoryWireStore;
