//! Derive macros for c55-wire
//!
//! `WireSerialize` and `WireDeserialize` implement the wire traits for plain record structs by
//! visiting the fields in declaration order. A field may carry `#[wrap(T)]` to be encoded through
//! the wire type `T` instead of its own type (e.g. `#[wrap(BinaryData16)] data: Vec<u8>`).
//!
//! Only structs are supported; anything else expands to a `compile_error!`.
//!
//! The field types are encoded through `Serialize` and `Deserialize`, which must be in scope
//! where the derive is used.

use proc_macro2::TokenStream;
use quote::ToTokens;
use quote::quote;
use quote::quote_spanned;
use syn::Data;
use syn::DeriveInput;
use syn::Field;
use syn::Fields;
use syn::Generics;
use syn::Index;
use syn::Type;
use syn::TypeParam;
use syn::parse_macro_input;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;

/// Derives `c55_wire::wire::ser::Serialize` for a struct.
#[proc_macro_derive(WireSerialize, attributes(wrap))]
pub fn wire_serialize(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident;
    let serialize_body = match make_serialize_body(&input.data) {
        Ok(body) => body,
        Err(error) => return error.to_compile_error().into(),
    };

    // The struct must include Serialize in the bounds of any type
    // that need to be serializable.
    let impl_generic = input.generics.to_token_stream();
    let name_generic = strip_generic_bounds(&input.generics).to_token_stream();
    let where_generic = input.generics.where_clause;

    let expanded = quote! {
        impl #impl_generic crate::wire::ser::Serialize for #name #name_generic #where_generic {
            type Input = Self;
            fn serialize<S: crate::wire::ser::Serializer>(
                value: &Self::Input,
                ser: &mut S,
            ) -> crate::wire::ser::SerializeResult {
                #serialize_body
                Ok(())
            }
        }
    };
    proc_macro::TokenStream::from(expanded)
}

/// Derives `c55_wire::wire::deser::Deserialize` for a struct.
#[proc_macro_derive(WireDeserialize, attributes(wrap))]
pub fn wire_deserialize(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident;
    let deserialize_body = match make_deserialize_body(&input.data) {
        Ok(body) => body,
        Err(error) => return error.to_compile_error().into(),
    };

    let impl_generic = input.generics.to_token_stream();
    let name_generic = strip_generic_bounds(&input.generics).to_token_stream();
    let where_generic = input.generics.where_clause;

    let expanded = quote! {
        impl #impl_generic crate::wire::deser::Deserialize for #name #name_generic #where_generic {
            type Output = Self;
            fn deserialize(
                deser: &mut crate::wire::deser::Deserializer<'_>,
            ) -> crate::wire::deser::DeserializeResult<Self> {
                #deserialize_body
            }
        }
    };
    proc_macro::TokenStream::from(expanded)
}

/// Returns the type named by a `#[wrap(T)]` attribute or the field's own type.
fn get_wrapped_type(field: &Field) -> syn::Result<Type> {
    let mut ty = field.ty.clone();
    for attr in &field.attrs {
        if attr.path().is_ident("wrap") {
            ty = attr.parse_args::<Type>()?;
        }
    }
    Ok(ty)
}

fn struct_fields(data: &Data) -> syn::Result<&Fields> {
    match *data {
        Data::Struct(ref data) => Ok(&data.fields),
        Data::Enum(ref data) => Err(syn::Error::new(
            data.enum_token.span(),
            "wire derives only support structs",
        )),
        Data::Union(ref data) => Err(syn::Error::new(
            data.union_token.span(),
            "wire derives only support structs",
        )),
    }
}

/// Fields are serialized in declaration order.
fn make_serialize_body(data: &Data) -> syn::Result<TokenStream> {
    let fields = struct_fields(data)?;
    let mut statements = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        let ty = get_wrapped_type(field)?;
        let member = match field.ident {
            Some(ref ident) => ident.to_token_stream(),
            None => Index::from(index).to_token_stream(),
        };
        statements.push(quote_spanned! {field.span() =>
            <#ty as Serialize>::serialize(&value.#member, ser)?;
        });
    }
    Ok(quote! {
        #(#statements)*
    })
}

fn make_deserialize_body(data: &Data) -> syn::Result<TokenStream> {
    let fields = struct_fields(data)?;
    let mut initializers = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        let ty = get_wrapped_type(field)?;
        let member = match field.ident {
            Some(ref ident) => ident.to_token_stream(),
            None => Index::from(index).to_token_stream(),
        };
        initializers.push(quote_spanned! {field.span() =>
            #member: <#ty as Deserialize>::deserialize(deser)?,
        });
    }
    Ok(quote! {
        Ok(Self {
            #(#initializers)*
        })
    })
}

/// Converts <T: Trait, S: Trait2> into <T, S>
fn strip_generic_bounds(input: &Generics) -> Generics {
    let input = input.clone();
    Generics {
        lt_token: input.lt_token,
        params: {
            let mut params = input.params.clone();
            params.iter_mut().for_each(|param| {
                *param = match param.clone() {
                    syn::GenericParam::Type(param) => syn::GenericParam::Type(TypeParam {
                        attrs: Vec::new(),
                        ident: param.ident.clone(),
                        colon_token: None,
                        bounds: Punctuated::new(),
                        eq_token: None,
                        default: None,
                    }),
                    any => any,
                }
            });
            params
        },
        gt_token: input.gt_token,
        where_clause: None,
    }
}
