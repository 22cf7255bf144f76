use std::fmt;

pub struct Already;

struct Point {
    x: i32,
    y: i32,
}

enum Shape {
    Circle(u32),
    Square(u32),
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

fn area(shape: &Shape) -> u32 {
    struct Scratch;
    let _ = Scratch;
    match shape {
        Shape::Circle(r) => 3 * r * r,
        Shape::Square(s) => s * s,
    }
}

mod geometry {
    unsafe trait Measure {}

    pub(crate) struct Visible;
}
