pub mod raw_event_repo;

pub use raw_event_repo::RawEventRepo;
