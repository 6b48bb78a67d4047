/*!
 * Git working tree status, used to focus a selection on changed files
 */

mod error;
mod status;

pub use error::{GitError, GitResult};
pub use status::{changed_paths, changed_paths_or_empty};
