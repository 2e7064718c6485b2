pub(crate) mod dispatcher;
pub(crate) mod engine;
pub(crate) mod kind;
