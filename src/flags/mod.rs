//! Decoding of PIV quality flags.
//!
//! PIV evaluation software marks every vector with a bitwise OR of quality
//! states (active, interpolated, replaced, filtered, ...). A flag value of `0`
//! marks an inactive vector without data. The mapping from bit to name is
//! supplied by the caller as a [`FlagMeaning`], bits missing from it are
//! tolerated and skipped so that newer flag sets can still be read.

mod counts;
pub use counts::{DEFAULT_DEFECTS, FlagCounts, eval_flags, flag_histogram};

mod decode;
pub use decode::{contains_flag, explain_flags, flag_label, flag_names};

mod mask;
pub use mask::{apply_mask, select_flagged, valid_mask};

mod meaning;
pub use meaning::{FlagMeaning, INACTIVE};
