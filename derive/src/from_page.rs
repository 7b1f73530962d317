use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Data, DeriveInput, Error, Fields, Ident, Pat, Result, Variant,
    parse::{Parse, ParseStream},
};

pub(crate) fn expand_from_page(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Enum(data) = &input.data else {
        Err(Error::new_spanned(
            input,
            "`FromPage` may only be derived on enums.",
        ))?
    };

    let variants = data
        .variants
        .iter()
        .map(VariantMetadata::parse)
        .collect::<Result<Vec<_>>>()?;

    if variants.is_empty() {
        Err(Error::new_spanned(
            input,
            "`FromPage` requires at least one variant.",
        ))?
    }

    let cases = variants.iter().map(|VariantMetadata { name, pattern }| {
        quote! { #pattern => FromPage::from_page(page).map(Self::#name), }
    });

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics FromPage for #name #ty_generics #where_clause {
            fn from_page(page: &Page) -> Option<Self> {
                match page.id() {
                    #(#cases)*
                    _ => None,
                }
            }
        }
    };

    Ok(expanded.into())
}

#[derive(Debug)]
struct VariantMetadata {
    name: Ident,
    pattern: Pat,
}

impl VariantMetadata {
    fn parse(variant: &Variant) -> Result<Self> {
        let Some(attr) = variant.attrs.iter().find(|a| a.path().is_ident("page")) else {
            Err(Error::new_spanned(
                &variant.ident,
                "Variant must have a `page(..)` attribute.",
            ))?
        };

        let PageAttribute { pattern } = attr.meta.require_list()?.parse_args()?;

        let Fields::Unnamed(fields) = &variant.fields else {
            Err(Error::new_spanned(
                &variant.fields,
                "Variant must hold a single unnamed field implementing `FromPage`.",
            ))?
        };

        if fields.unnamed.len() != 1 {
            Err(Error::new_spanned(
                &fields.unnamed,
                "Variant must hold a single unnamed field implementing `FromPage`.",
            ))?
        }

        Ok(Self {
            name: variant.ident.clone(),
            pattern,
        })
    }
}

#[derive(Debug)]
struct PageAttribute {
    pattern: Pat,
}

impl Parse for PageAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let pattern = Pat::parse_multi_with_leading_vert(input)?;
        Ok(Self { pattern })
    }
}
