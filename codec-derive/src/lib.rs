extern crate proc_macro;
use proc_macro::TokenStream;

mod decode;
mod encode;

/// Derives `Decode` by decoding each field in declaration order.
#[proc_macro_derive(Decode)]
pub fn decodable(input: TokenStream) -> TokenStream {
    let ast = syn::parse(input).unwrap();
    decode::impl_decode_macro(&ast)
}

/// Derives `Encode` by encoding each field in declaration order. Struct and
/// enum bodies are supported; enum variants are tagged with their
/// declaration index as a single leading byte.
#[proc_macro_derive(Encode)]
pub fn encodable(input: TokenStream) -> TokenStream {
    let ast = syn::parse(input).unwrap();
    encode::impl_encode_macro(&ast)
}
