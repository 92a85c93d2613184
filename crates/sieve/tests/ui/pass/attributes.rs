use serde::Serialize;
use sieve::Descriptor;

#[derive(Descriptor, Serialize)]
struct Settings {
    #[serde(rename(serialize = "colorScheme"), default)]
    color_scheme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    font: Option<String>,
    #[serde(skip)]
    etag: u64,
}

#[derive(Descriptor)]
struct Patch {
    #[sieve(column = "type")]
    r#type: String,
    #[sieve(column = "settings", update = "merge_json")]
    settings: Option<Settings>,
    #[sieve(column = "-")]
    note: String,
    #[sieve(flatten)]
    audit: Audit,
}

#[derive(Descriptor)]
struct Audit {
    #[sieve(column = "updated_by")]
    updated_by: String,
}

fn main() {
    let patch = Patch {
        r#type: "x".into(),
        settings: None,
        note: String::new(),
        audit: Audit {
            updated_by: "ops".into(),
        },
    };
    let _ = sieve::update(&patch);
}
