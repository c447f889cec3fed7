//! The on-disk workbook format.

pub mod workbook_codec;
