use sieve::Descriptor;

#[derive(Descriptor)]
struct Page<T>
where
    T: Copy,
{
    #[sieve(column = "cursor", query = ">")]
    cursor: T,
    #[sieve(column = "size")]
    size: u32,
}

fn main() {
    let page = Page {
        cursor: 5_i64,
        size: 10,
    };
    let _ = sieve::filter(&page);
    let _ = sieve::descriptor_of::<Page<u64>>();
}
