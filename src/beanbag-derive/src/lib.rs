mod attrs;
mod impls;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Implements `beanbag::bean::Bean`, declaring the interfaces listed in
/// `#[bean(implements(dyn A, dyn B))]`.
#[proc_macro_derive(Bean, attributes(bean))]
pub fn derive_bean(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    match impls::expand_bean(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// Implements `beanbag::bean::Bean` and `beanbag::component::Component`.
///
/// Fields annotated with `#[inject]` or `#[inject("name")]` become injection
/// slots; fields without the annotation are left to [`Default`].
#[proc_macro_derive(Component, attributes(bean, inject))]
pub fn derive_component(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    match impls::expand_component(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}
