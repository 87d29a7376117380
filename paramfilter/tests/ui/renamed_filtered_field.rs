use paramfilter::{IntoParameterTree, Params};

#[derive(Params)]
struct PaymentForm {
    amount: u64,
    #[params(filtered, rename = "cc")]
    card_number: String,
    #[params(skip)]
    idempotency_key: String,
}

fn main() {
    let form = PaymentForm {
        amount: 100,
        card_number: "4111111111111111".into(),
        idempotency_key: "abc".into(),
    };
    let _ = &form.idempotency_key;
    let tree = form.into_parameter_tree();
    assert!(tree.as_mapping().is_some_and(|params| params.contains_key("cc")));
}
