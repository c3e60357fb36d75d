mod endings;
mod layout;
mod whitespace;

pub use endings::{LineEnding, to_lf};
pub use layout::canonicalize;
pub use whitespace::collapse_blank_runs;
