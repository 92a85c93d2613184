use sieve::Descriptor;

#[rustfmt::skip]
#[derive(Descriptor)]
struct Window<T, U> where T: Copy, U: Clone {
    #[sieve(column = "after", query = ">=")]
    after: T,
    #[sieve(column = "label")]
    label: U,
}

fn main() {
    let window = Window {
        after: 3_u32,
        label: String::from("recent"),
    };
    let _ = sieve::filter(&window);
    let _ = sieve::descriptor_of::<Window<i64, String>>();
}
