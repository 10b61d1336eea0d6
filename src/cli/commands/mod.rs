//! Command execution for `prepare`, `package` and `build`.

mod build;
mod helpers;
mod package;
mod prepare;

use crate::cli::{Args, Command, OutputManager};
use crate::error::Result;

use build::execute_build;
use package::execute_package;
use prepare::execute_prepare;

/// Execute the subcommand named by `args`
///
/// With `--json` status lines are suppressed and a single JSON document is
/// printed on stdout after the command succeeds.
pub async fn execute_command(args: Args) -> Result<i32> {
    let output = OutputManager::new(args.verbose, args.quiet || args.json);

    match &args.command {
        Command::Prepare(prepare) => execute_prepare(prepare, &output, args.json).await,
        Command::Package(package) => execute_package(package, &output, args.json).await,
        Command::Build(build) => execute_build(build, &output, args.json).await,
    }
}
