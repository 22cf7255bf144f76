struct Engine;

union Bits {
    raw: u32,
    half: [u16; 2],
}
