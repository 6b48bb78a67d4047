/*!
 * Framework catalog and detection
 */

mod catalog;
mod detector;

pub use catalog::{by_priority, find, FrameworkDefinition, PresetRule, Trigger, FRAMEWORKS};
pub use detector::detect;
