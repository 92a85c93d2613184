use sieve::Descriptor;

#[derive(Descriptor)]
struct Clause {
    #[sieve(column = "tag")]
    tag: Option<String>,
    #[sieve(query = "or")]
    any: Vec<Clause>,
    #[sieve(query = "or")]
    nested: Option<Box<Clause>>,
}

fn main() {
    let clause = Clause {
        tag: None,
        any: vec![],
        nested: None,
    };
    let _ = sieve::filter(&clause);
}
