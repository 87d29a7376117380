use paramfilter::{IntoParameterTree, Params};

#[derive(Params)]
struct Braced {}

#[derive(Params)]
struct Parens();

#[derive(Params)]
struct AllSkipped {
    #[params(skip)]
    hidden: bool,
}

fn main() {
    assert!(Braced {}.into_parameter_tree().as_mapping().is_some_and(|m| m.is_empty()));
    assert!(Parens().into_parameter_tree().as_sequence().is_some_and(|s| s.is_empty()));
    let skipped = AllSkipped { hidden: true };
    let _ = skipped.hidden;
    assert!(skipped.into_parameter_tree().as_mapping().is_some_and(|m| m.is_empty()));
}
