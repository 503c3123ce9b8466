//! Backing-list rotation that keeps content in step with a visual wrap
//!
//! When the processor wraps the offset by one pitch, the caller must move one
//! item across the list boundary so the same cells stay under the viewport:
//!
//! - Forward: remove the last item, insert it at the front
//! - Backward: remove the first item, append it at the back

use std::collections::VecDeque;

use crate::config::ScrollDirection;

pub trait RotateContent {
    /// Rotate one item for a wrap in `direction`. Empty lists are untouched.
    fn rotate_for(&mut self, direction: ScrollDirection);
}

impl<T> RotateContent for Vec<T> {
    fn rotate_for(&mut self, direction: ScrollDirection) {
        self.as_mut_slice().rotate_for(direction);
    }
}

impl<T> RotateContent for [T] {
    fn rotate_for(&mut self, direction: ScrollDirection) {
        if self.is_empty() {
            return;
        }
        match direction {
            ScrollDirection::Forward => self.rotate_right(1),
            ScrollDirection::Backward => self.rotate_left(1),
        }
    }
}

impl<T> RotateContent for VecDeque<T> {
    fn rotate_for(&mut self, direction: ScrollDirection) {
        match direction {
            ScrollDirection::Forward => {
                if let Some(last) = self.pop_back() {
                    self.push_front(last);
                }
            }
            ScrollDirection::Backward => {
                if let Some(first) = self.pop_front() {
                    self.push_back(first);
                }
            }
        }
    }
}
