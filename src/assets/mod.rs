pub(crate) mod decode;
pub(crate) mod font;
pub(crate) mod image;
