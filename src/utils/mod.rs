pub mod helper;

mod axis;
pub use axis::{check_same_shape, lane_len, resolve_axis, validate_ddof};
