mod bbox;
mod labels;
mod types;

pub use bbox::{BoundingBox, iou_batch};
pub use labels::{COCO_CLASSES, NUM_CLASSES, class_name};
pub use types::Detection;
