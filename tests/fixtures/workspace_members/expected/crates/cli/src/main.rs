pub(crate) enum Command {
    Run,
}

fn main() {}
