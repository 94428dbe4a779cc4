use proc_macro::TokenStream;
use quote::quote;
use syn;

pub fn impl_encode_macro(ast: &syn::DeriveInput) -> TokenStream {
    let name = ast.ident.clone();
    match ast.data {
        syn::Data::Struct(ref data) => {
            let statements: Vec<quote::__private::TokenStream> = data
                .fields
                .iter()
                .zip(0..1_000_000)
                .map(|(field, index)| encode_field(field, index))
                .collect();

            let expanded = quote! {
                impl chain_core::codec::Encode for #name {
                    fn encode<W: std::io::Write>(
                        &self,
                        enc: &mut chain_core::codec::Encoder<W>,
                    ) -> Result<(), chain_core::codec::EncodeError> {
                        #(#statements)*
                        Ok(())
                    }
                }
            };
            TokenStream::from(expanded)
        }
        syn::Data::Enum(ref data) => {
            let variants: Vec<quote::__private::TokenStream> = data
                .variants
                .iter()
                .zip(0u8..)
                .map(|(variant, tag)| encode_variant(variant, &name, tag))
                .collect();

            let expanded = quote! {
                impl chain_core::codec::Encode for #name {
                    fn encode<W: std::io::Write>(
                        &self,
                        enc: &mut chain_core::codec::Encoder<W>,
                    ) -> Result<(), chain_core::codec::EncodeError> {
                        match *self {
                            #(#variants)*
                        }
                        Ok(())
                    }
                }
            };
            TokenStream::from(expanded)
        }
        _ => unimplemented!("Encode can only be derived for structs and enums"),
    }
}

fn encode_field(field: &syn::Field, index: usize) -> quote::__private::TokenStream {
    match field.ident.clone() {
        Some(id) => quote! { self.#id.encode(enc)?; },
        None => {
            let index = syn::Index::from(index);
            quote! { self.#index.encode(enc)?; }
        }
    }
}

fn encode_variant(
    variant: &syn::Variant,
    name: &syn::Ident,
    tag: u8,
) -> quote::__private::TokenStream {
    let ident = variant.ident.clone();

    let subfields: Vec<quote::__private::TokenStream> = variant
        .fields
        .iter()
        .map(|field| match field.ident.clone() {
            Some(ident) => quote! { ref #ident, },
            None => quote!(ref inner),
        })
        .collect();

    let statements: Vec<quote::__private::TokenStream> = variant
        .fields
        .iter()
        .map(|field| match field.ident.clone() {
            Some(ident) => quote! { #ident.encode(enc)?; },
            None => quote! { inner.encode(enc)?; },
        })
        .collect();

    let body = if !subfields.is_empty() {
        quote! { #name::#ident ( #(#subfields)* ) => {
            enc.write_byte(#tag)?;
            #(#statements)*
        }, }
    } else {
        quote! { #name::#ident => {
            enc.write_byte(#tag)?;
        }, }
    };
    body
}
