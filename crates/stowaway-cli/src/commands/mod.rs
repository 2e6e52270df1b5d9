//! Command implementations, one module per subcommand. Each `execute`
//! takes the shared global options and its own arguments.

pub mod check;
pub mod closure;
pub mod patterns;
pub mod report;
pub mod resolve;
pub(crate) mod utils;

pub use check::execute as check_execute;
pub use closure::execute as closure_execute;
pub use patterns::execute as patterns_execute;
pub use report::execute as report_execute;
pub use resolve::execute as resolve_execute;
