mod broken;

pub(crate) struct Whole;
