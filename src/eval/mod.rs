pub(crate) mod timeline;
