pub(crate) mod constants;
mod helpers;
pub(crate) mod pickers;

pub(crate) use pickers::{PickerView, draw_instance_picker};
