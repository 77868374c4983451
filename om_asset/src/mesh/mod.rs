pub(crate) mod obj;
