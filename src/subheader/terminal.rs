//! `Terminal` subheader: the zero-size end marker written into a
//! finalised metadata page's subheader index (spec.md §4.E "Terminal").

use super::{LayoutView, Subheader};

#[derive(Debug, Clone, Copy, Default)]
pub struct Terminal;

impl Subheader for Terminal {
    fn signature(&self) -> u64 {
        0
    }

    fn size(&self) -> usize {
        0
    }

    fn write(&self, _buf: &mut [u8], _offset: usize, _view: &dyn LayoutView) {}

    fn type_code(&self) -> u8 {
        0
    }

    fn compression_code(&self) -> u8 {
        1
    }
}
