use proc_macro::TokenStream;
use quote::quote;
use syn;

pub fn impl_decode_macro(ast: &syn::DeriveInput) -> TokenStream {
    let name = ast.ident.clone();
    match ast.data {
        syn::Data::Struct(ref data) => {
            let is_tuple_struct = matches!(data.fields, syn::Fields::Unnamed(_));
            let statements: Vec<quote::__private::TokenStream> = data
                .fields
                .iter()
                .map(decode_field)
                .collect();

            let expanded = if is_tuple_struct {
                quote! {
                    impl chain_core::codec::Decode for #name {
                        fn decode<R: std::io::Read>(
                            dec: &mut chain_core::codec::Decoder<R>,
                        ) -> Result<Self, chain_core::codec::DecodeError> {
                            Ok(#name ( #(#statements)* ))
                        }
                    }
                }
            } else {
                quote! {
                    impl chain_core::codec::Decode for #name {
                        fn decode<R: std::io::Read>(
                            dec: &mut chain_core::codec::Decoder<R>,
                        ) -> Result<Self, chain_core::codec::DecodeError> {
                            Ok(#name { #(#statements)* })
                        }
                    }
                }
            };
            TokenStream::from(expanded)
        }
        syn::Data::Enum(ref data) => {
            let arms: Vec<quote::__private::TokenStream> = data
                .variants
                .iter()
                .zip(0u8..)
                .map(|(variant, tag)| decode_variant(variant, &name, tag))
                .collect();

            let expanded = quote! {
                impl chain_core::codec::Decode for #name {
                    fn decode<R: std::io::Read>(
                        dec: &mut chain_core::codec::Decoder<R>,
                    ) -> Result<Self, chain_core::codec::DecodeError> {
                        let tag = dec.read_byte()?;
                        match tag {
                            #(#arms)*
                            other => Err(chain_core::codec::DecodeError::Decode(
                                format!("unknown variant tag {} for {}", other, stringify!(#name)),
                            )),
                        }
                    }
                }
            };
            TokenStream::from(expanded)
        }
        _ => unimplemented!("Decode can only be derived for structs and enums"),
    }
}

fn decode_field(field: &syn::Field) -> quote::__private::TokenStream {
    let ty = field.ty.clone();
    match field.ident.clone() {
        Some(name) => quote! { #name: <#ty as chain_core::codec::Decode>::decode(dec)?, },
        None => quote! { <#ty as chain_core::codec::Decode>::decode(dec)?, },
    }
}

fn decode_variant(
    variant: &syn::Variant,
    name: &syn::Ident,
    tag: u8,
) -> quote::__private::TokenStream {
    let ident = variant.ident.clone();

    if variant.fields.is_empty() {
        return quote! { #tag => Ok(#name::#ident), };
    }

    let statements: Vec<quote::__private::TokenStream> = variant
        .fields
        .iter()
        .map(|field| {
            let ty = field.ty.clone();
            quote! { <#ty as chain_core::codec::Decode>::decode(dec)?, }
        })
        .collect();

    quote! { #tag => Ok(#name::#ident ( #(#statements)* )), }
}
