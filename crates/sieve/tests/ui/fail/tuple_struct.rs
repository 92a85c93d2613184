use sieve::Descriptor;

#[derive(Descriptor)]
struct Pair(i64, i64);

fn main() {
    let pair = Pair(1, 2);
    let _ = pair.0 + pair.1;
}
