pub(crate) struct Engine;

pub(crate) union Bits {
    raw: u32,
    half: [u16; 2],
}
