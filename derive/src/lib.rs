use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod from_page;

#[proc_macro_derive(FromPage, attributes(page))]
pub fn derive_from_page(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match from_page::expand_from_page(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error().into(),
    }
}
