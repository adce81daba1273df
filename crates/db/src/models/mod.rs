pub mod raw_event;
