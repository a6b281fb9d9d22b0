pub mod commands;
pub mod env;
pub mod lcp;
pub mod lrc;
pub mod output;
pub mod policy;
pub mod runtime;
pub mod scan;

pub use lcp::cmd_lcp;
pub use lrc::cmd_lrc;
pub use policy::cmd_policy;
pub use scan::cmd_scan;
