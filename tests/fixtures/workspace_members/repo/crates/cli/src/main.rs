enum Command {
    Run,
}

fn main() {}
