use clap::Subcommand;

use super::lcp::LcpArgs;
use super::lrc::LrcArgs;
use super::policy::PolicyArgs;
use super::scan::ScanArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Run the full beacon against a page snapshot and print the report
    Scan(ScanArgs),

    /// Run only the above-the-fold candidate scan
    Lcp(LcpArgs),

    /// Run only the lazy render scan
    Lrc(LrcArgs),

    /// Inspect the effective beacon policy
    Policy(PolicyArgs),
}
