use std::marker::PhantomData;

use paramfilter::{IntoParameterTree, Params};

struct UserId;

#[derive(Params)]
struct TypedId<T> {
    id: String,
    _marker: PhantomData<T>,
}

#[derive(Params)]
struct Wrapper<'a, T: Clone> {
    label: &'a str,
    inner: Option<T>,
}

fn main() {
    let id = TypedId::<UserId> {
        id: "42".into(),
        _marker: PhantomData,
    };
    let _ = id.into_parameter_tree();

    let wrapper = Wrapper {
        label: "x",
        inner: Some(3_i32),
    };
    let _ = wrapper.into_parameter_tree();
}
