struct Half {
    field: u8,
