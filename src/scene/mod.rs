pub(crate) mod collection;
pub(crate) mod manifest;
pub(crate) mod quote;
pub(crate) mod settings;
