pub(crate) mod blend;
pub(crate) mod compositor;
pub(crate) mod fonts;
pub(crate) mod layout;
pub(crate) mod style;
