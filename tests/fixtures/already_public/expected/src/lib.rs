pub struct A;

pub(crate) enum B {
    One,
}

pub(super) trait C {}
