pub(crate) mod login;
pub(crate) mod meta;
pub(crate) mod shared;
pub(crate) mod stats;
pub(crate) mod theme;
pub(crate) mod validate;
