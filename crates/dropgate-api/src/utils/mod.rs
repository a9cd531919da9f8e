pub mod filename;
pub mod ip_extraction;
pub mod session_id;
