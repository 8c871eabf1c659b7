pub(crate) mod backend;
pub(crate) mod compositor;
pub(crate) mod overlay;
pub(crate) mod placement;
