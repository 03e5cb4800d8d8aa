mod log;

pub use log::MemoryArchiveLog;
