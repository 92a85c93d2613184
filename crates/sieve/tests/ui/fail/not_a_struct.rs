use sieve::Descriptor;

#[derive(Descriptor)]
enum Status {
    Open,
    Closed,
}

fn main() {
    let _ = [Status::Open, Status::Closed];
}
