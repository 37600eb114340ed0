use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{
    Data, DeriveInput, Error as SynError, Field, Fields, GenericArgument, Ident, LitStr,
    PathArguments, Result as SynResult, Type, TypePath, Visibility,
};

use crate::attrs::{self, BeanAttributes, InjectAttribute};

#[derive(Debug)]
struct SlotData {
    ident: Ident,
    name: String,
    qualifier: Option<LitStr>,
    public: bool,
    kind: SlotKind,
}

#[derive(Debug)]
enum SlotKind {
    Inferred(Type),
    Interface(Type),
    Unsupported(Type),
}

pub fn expand_bean(input: &DeriveInput) -> SynResult<TokenStream2> {
    let attr_data = attrs::parse_bean_attributes(&input.attrs)?;
    Ok(expand_bean_implementation(input, &attr_data))
}

pub fn expand_component(input: &DeriveInput) -> SynResult<TokenStream2> {
    let attr_data = attrs::parse_bean_attributes(&input.attrs)?;
    let slots = parse_slots(input)?;

    let bean = expand_bean_implementation(input, &attr_data);
    let component = expand_component_implementation(input, &slots);

    Ok(quote! {
        #bean
        #component
    })
}

fn parse_slots(input: &DeriveInput) -> SynResult<Vec<SlotData>> {
    let Data::Struct(data) = &input.data else {
        return Err(SynError::new(
            input.ident.span(),
            "`#[derive(Component)]` only supports structs",
        ));
    };

    match &data.fields {
        Fields::Named(fields) => fields
            .named
            .iter()
            .filter_map(|field| parse_slot(field).transpose())
            .collect(),
        Fields::Unnamed(fields) => {
            for field in &fields.unnamed {
                if let InjectAttribute::Marked { .. } = attrs::parse_inject_attribute(&field.attrs)? {
                    return Err(SynError::new(
                        field.span(),
                        "`#[inject]` is only supported on named fields",
                    ));
                }
            }
            Ok(Vec::new())
        }
        Fields::Unit => Ok(Vec::new()),
    }
}

fn parse_slot(field: &Field) -> SynResult<Option<SlotData>> {
    let InjectAttribute::Marked { qualifier } = attrs::parse_inject_attribute(&field.attrs)? else {
        return Ok(None);
    };
    let Some(ident) = field.ident.clone() else {
        unreachable!("named fields should have an identifier")
    };

    Ok(Some(SlotData {
        name: ident.unraw().to_string(),
        ident,
        qualifier,
        public: matches!(field.vis, Visibility::Public(_)),
        kind: classify_slot_type(&field.ty),
    }))
}

/// `Inject<dyn Trait>` is an interface slot. `Inject<Path>` is classified when
/// the program runs, since the path may be an alias of a trait object.
/// Anything else can't receive a bean.
fn classify_slot_type(ty: &Type) -> SlotKind {
    let Type::Path(TypePath { qself: None, path }) = ty else {
        return SlotKind::Unsupported(ty.clone());
    };
    let Some(last) = path.segments.last() else {
        return SlotKind::Unsupported(ty.clone());
    };
    if last.ident != "Inject" {
        return SlotKind::Unsupported(ty.clone());
    }
    let PathArguments::AngleBracketed(args) = &last.arguments else {
        return SlotKind::Unsupported(ty.clone());
    };
    if args.args.len() != 1 {
        return SlotKind::Unsupported(ty.clone());
    }

    match args.args.first() {
        Some(GenericArgument::Type(inner @ Type::TraitObject(_))) => {
            SlotKind::Interface(inner.clone())
        }
        Some(GenericArgument::Type(inner @ Type::Path(_))) => SlotKind::Inferred(inner.clone()),
        _ => SlotKind::Unsupported(ty.clone()),
    }
}

fn expand_bean_implementation(input: &DeriveInput, attr_data: &BeanAttributes) -> TokenStream2 {
    let self_type = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let interfaces = &attr_data.interfaces;

    quote! {
        impl #impl_generics ::beanbag::bean::Bean for #self_type #ty_generics #where_clause {
            fn interfaces() -> ::std::vec::Vec<::beanbag::bean::Interface> {
                ::std::vec![
                    #(
                        ::beanbag::bean::Interface::new::<Self, #interfaces>(
                            |bean: ::std::sync::Arc<Self>| -> ::std::sync::Arc<#interfaces> { bean }
                        ),
                    )*
                ]
            }
        }
    }
}

fn expand_component_implementation(input: &DeriveInput, slots: &[SlotData]) -> TokenStream2 {
    let self_type = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let injection_points = slots.iter().map(|slot| {
        let name = &slot.name;
        let qualifier = match &slot.qualifier {
            Some(lit) => quote! { ::std::option::Option::Some(#lit) },
            None => quote! { ::std::option::Option::None },
        };
        let visibility = if slot.public {
            quote! { ::beanbag::component::Visibility::Public }
        } else {
            quote! { ::beanbag::component::Visibility::Restricted }
        };

        match &slot.kind {
            SlotKind::Inferred(inner) => quote! {
                ::beanbag::component::InjectionPoint::of::<#inner>(#name, #qualifier, #visibility)
            },
            SlotKind::Interface(inner) => quote! {
                ::beanbag::component::InjectionPoint::interface::<#inner>(#name, #qualifier, #visibility)
            },
            SlotKind::Unsupported(ty) => quote! {
                ::beanbag::component::InjectionPoint::unsupported(
                    #name,
                    ::std::any::type_name::<#ty>(),
                    #qualifier,
                    #visibility,
                )
            },
        }
    });

    let setters = slots
        .iter()
        .filter(|slot| !matches!(slot.kind, SlotKind::Unsupported(_)))
        .map(|slot| {
            let name = &slot.name;
            let ident = &slot.ident;
            quote! { #name => self.#ident.fill(dependency), }
        });

    quote! {
        impl #impl_generics ::beanbag::component::Component for #self_type #ty_generics #where_clause {
            fn injection_points() -> ::std::vec::Vec<::beanbag::component::InjectionPoint> {
                ::std::vec![#(#injection_points),*]
            }

            #[allow(unused_variables)]
            fn inject(
                &self,
                field: &str,
                dependency: &::beanbag::bean::BeanRef,
            ) -> ::std::result::Result<(), ::beanbag::component::InjectError> {
                match field {
                    #(#setters)*
                    _ => ::std::result::Result::Err(
                        ::beanbag::component::InjectError::UnknownField {
                            field: ::std::string::ToString::to_string(field),
                        },
                    ),
                }
            }
        }
    }
}
