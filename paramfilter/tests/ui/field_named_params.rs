use paramfilter::{IntoParameterTree, Params};

#[derive(Params)]
struct Envelope {
    id: i64,
    params: String,
}

fn main() {
    let tree = Envelope {
        id: 1,
        params: "q=rust".into(),
    }
    .into_parameter_tree();
    assert!(tree.as_mapping().is_some_and(|m| m["params"] == "q=rust"));
}
